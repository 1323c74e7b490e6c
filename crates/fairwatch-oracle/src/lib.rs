//! Account-status resolution for the fairwatch pipeline.
//!
//! Threshold calibration needs a weak label per flagged player: is the
//! account in good standing, closed, or marked for a terms-of-service
//! violation? This crate defines the [`AccountOracle`] capability the model
//! is abstracted over, plus three implementations:
//!
//! - [`LichessOracle`](lichess::LichessOracle): live HTTP lookups against the
//!   lichess user API, paced to one request at a time
//! - [`StatusFileOracle`](status_file::StatusFileOracle): offline lookups
//!   from a previously labeled CSV
//! - [`FixedOracle`](fixture::FixedOracle): an in-memory map for tests
//!
//! The oracle may block and may fail transiently; callers are expected to
//! degrade (treat the status as unknown) rather than abort.

pub mod fixture;
pub mod lichess;
pub mod status;
pub mod status_file;

pub use self::{
    fixture::FixedOracle, lichess::LichessOracle, status::AccountStatus,
    status_file::StatusFileOracle,
};

/// Capability to resolve a player handle to an account status.
///
/// Implementations must be idempotent: resolving the same handle twice
/// returns the same status (modulo upstream changes). Callers cache results;
/// implementations do not have to.
pub trait AccountOracle: Send + Sync {
    /// Resolves one player handle.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] on transient failure. A definitively missing
    /// account is not an error; it resolves to
    /// [`AccountStatus::NotFound`].
    fn resolve(&self, player: &str) -> Result<AccountStatus, OracleError>;
}

/// Transient failure talking to an account-status source.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum OracleError {
    #[display("account status request failed: {_0}")]
    Http(reqwest::Error),
    #[display("rate limited by the account status endpoint")]
    RateLimited,
    #[display("malformed payload from the account status endpoint: {_0}")]
    MalformedPayload(reqwest::Error),
    #[display("unexpected HTTP status {status} from the account status endpoint")]
    UnexpectedStatus { status: u16 },
}
