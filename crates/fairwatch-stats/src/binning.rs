//! Fixed-width rating binning.
//!
//! Ratings are grouped into 100-point intervals labelled by their lower edge:
//! the label `1500` covers `(1500, 1600]`. Intervals are right-closed, so a
//! rating sitting exactly on an interior edge belongs to the bin below it.
//! The bottom edge of the covered span is the one exception: it is clamped
//! into the lowest bin so every value in the span receives a label.
//!
//! # Examples
//!
//! ```
//! use fairwatch_stats::binning::RatingBins;
//!
//! let bins = RatingBins::covering(1500.0, 1787.0);
//! assert_eq!(bins.bin_of(1500.0), 1500); // bottom edge clamps into the lowest bin
//! assert_eq!(bins.bin_of(1600.0), 1500); // interior edge belongs to the bin below
//! assert_eq!(bins.bin_of(1600.5), 1600);
//! assert_eq!(bins.bin_of(1787.0), 1700);
//! ```

/// Width of every rating bin.
pub const BIN_WIDTH: f64 = 100.0;

/// A contiguous span of fixed-width, right-closed rating bins.
///
/// Built once per feature batch from the smallest and largest mean rating in
/// the batch, then used to label every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBins {
    first_label: i64,
    last_label: i64,
}

impl RatingBins {
    /// Builds the span of bins covering `min..=max`.
    ///
    /// The first bin's lower edge is `min` rounded down to a multiple of the
    /// bin width; the last bin covers `max`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max` or either bound is not finite.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn covering(min: f64, max: f64) -> Self {
        assert!(
            min.is_finite() && max.is_finite() && min <= max,
            "bin bounds must be finite with min <= max"
        );

        let first_label = ((min / BIN_WIDTH).floor() * BIN_WIDTH) as i64;
        let last_label = ((((max / BIN_WIDTH).ceil() - 1.0) * BIN_WIDTH) as i64).max(first_label);
        Self {
            first_label,
            last_label,
        }
    }

    /// Returns the lower-edge label of the bin containing `rating`.
    ///
    /// Intervals are right-closed; values at or below the bottom of the span
    /// are clamped into the first bin, values above the span into the last.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn bin_of(&self, rating: f64) -> i64 {
        let raw = (((rating / BIN_WIDTH).ceil() - 1.0) * BIN_WIDTH) as i64;
        raw.clamp(self.first_label, self.last_label)
    }

    /// Lower edge of the first bin in the span.
    #[must_use]
    pub fn first_label(&self) -> i64 {
        self.first_label
    }

    /// Lower edge of the last bin in the span.
    #[must_use]
    pub fn last_label(&self) -> i64 {
        self.last_label
    }
}
