//! Per-player feature aggregation for the fairwatch pipeline.
//!
//! Consumes the observation ledgers produced by `fairwatch-extract` and
//! collapses each qualifying ledger into one feature row describing how far
//! the player's actual scores sit above rating-implied expectation.
//!
//! # Modules
//!
//! - [`expected`]: the fixed-deviation expected-score curve
//! - [`row`]: feature rows and the aggregation routine
//!
//! # Example
//!
//! ```
//! use fairwatch_features::expected::expected_score;
//!
//! // equal ratings meet at an even expectation
//! assert_eq!(expected_score(1500.0, 1500.0), 0.5);
//! ```

pub mod expected;
pub mod row;

pub use self::{
    expected::{RATING_DEVIATION, expected_score},
    row::{MIN_GAMES, PlayerFeatureRow, build_feature_rows},
};
