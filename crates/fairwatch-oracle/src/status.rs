//! Coarse account status labels.

use serde::{Deserialize, Serialize};

/// Account standing of a player, as far as the labeling source knows.
///
/// The serialized strings are the label vocabulary used in the labeled
/// feature artifacts (`tosViolation` keeps the upstream API's casing).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize,
)]
pub enum AccountStatus {
    /// Account in good standing.
    #[serde(rename = "open")]
    #[display("open")]
    Open,
    /// Account closed; possibly cheating, possibly just gone.
    #[serde(rename = "closed")]
    #[display("closed")]
    Closed,
    /// Marked for cheating or rating manipulation.
    #[serde(rename = "tosViolation")]
    #[display("tosViolation")]
    TosViolation,
    /// The labeling source has no such account.
    #[serde(rename = "not_found")]
    #[display("not_found")]
    NotFound,
    /// Resolution failed or was never attempted.
    #[serde(rename = "unknown")]
    #[display("unknown")]
    Unknown,
}
