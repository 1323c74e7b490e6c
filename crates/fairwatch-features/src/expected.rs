//! Fixed-deviation expected-score curve.
//!
//! The full glicko-2 model weighs each game by both players' rating
//! deviations, which a monthly corpus dump does not carry. This module uses
//! the glicko-2 win-expectancy curve with both deviations pinned to a
//! representative constant, which is enough to net out opponent strength:
//!
//! ```text
//! g(x)           = 1 / sqrt(1 + 3x² / π²)
//! expected(a, b) = 1 / (1 + exp(−g(sqrt(RD² + RD²)) · (a − b)))
//! ```

use std::f64::consts::PI;

/// Rating deviation assumed for every player on both sides.
pub const RATING_DEVIATION: f64 = 80.0;

/// Expected score of a player rated `rating` against `opponent_rating`.
///
/// Symmetric: `expected_score(a, b) + expected_score(b, a)` is 1.0 for any
/// pair, and equal ratings yield exactly 0.5.
///
/// # Examples
///
/// ```
/// use fairwatch_features::expected::expected_score;
///
/// assert_eq!(expected_score(1800.0, 1800.0), 0.5);
/// assert!(expected_score(1600.0, 1500.0) > 0.5);
/// ```
#[must_use]
pub fn expected_score(rating: f64, opponent_rating: f64) -> f64 {
    let combined_deviation = (2.0 * RATING_DEVIATION.powi(2)).sqrt();
    let advantage = g(combined_deviation) * (rating - opponent_rating);
    1.0 / (1.0 + (-advantage).exp())
}

/// Deviation damping factor of the glicko-2 curve.
fn g(x: f64) -> f64 {
    1.0 / (1.0 + 3.0 * x.powi(2) / PI.powi(2)).sqrt()
}
