/// Summary statistics for a batch of observations.
///
/// Dispersion uses the sample standard deviation (`n - 1` denominator) and the
/// median averages the two middle elements for even-sized batches, so the
/// numbers line up with the tabular tooling the pipeline's artifacts are
/// compared against.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Number of values in the batch.
    pub count: usize,
    /// The minimum value in the batch.
    pub min: f64,
    /// The maximum value in the batch.
    pub max: f64,
    /// The arithmetic mean of the batch.
    pub mean: f64,
    /// The median of the batch (mean of the two middle values for even sizes).
    pub median: f64,
    /// The sample standard deviation (0.0 for a single-element batch).
    pub std_dev: f64,
}

impl Summary {
    /// Computes summary statistics from unsorted values.
    ///
    /// The values are collected and sorted internally before computing
    /// statistics.
    ///
    /// # Returns
    ///
    /// * `Some(Summary)` - if the batch contains at least one value
    /// * `None` - if the batch is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use fairwatch_stats::summary::Summary;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let summary = Summary::of(values).unwrap();
    /// assert_eq!(summary.min, 1.0);
    /// assert_eq!(summary.max, 5.0);
    /// assert_eq!(summary.mean, 3.0);
    /// assert_eq!(summary.median, 3.0);
    /// ```
    #[must_use]
    pub fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes summary statistics from pre-sorted values.
    ///
    /// Use this when the batch is already sorted to avoid sorting twice.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().copied().sum::<f64>() / n;
        let median = if count % 2 == 0 {
            (sorted_values[count / 2 - 1] + sorted_values[count / 2]) / 2.0
        } else {
            sorted_values[count / 2]
        };
        let std_dev = if count < 2 {
            0.0
        } else {
            let sum_sq = sorted_values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (sum_sq / (n - 1.0)).sqrt()
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch() {
        assert!(Summary::of([]).is_none());
    }

    #[test]
    fn test_single_value() {
        let summary = Summary::of([42.0]).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, 42.0);
        assert_eq!(summary.median, 42.0);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn test_median_even_count_averages_middles() {
        let summary = Summary::of([1.0, 2.0, 3.0, 10.0]).unwrap();
        assert_eq!(summary.median, 2.5);
    }

    #[test]
    fn test_median_odd_count() {
        let summary = Summary::of([10.0, 1.0, 3.0]).unwrap();
        assert_eq!(summary.median, 3.0);
    }

    #[test]
    fn test_sample_std_dev() {
        // variance of [2, 4, 4, 4, 5, 5, 7, 9] with n-1 denominator is 32/7
        let summary = Summary::of([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((summary.std_dev - expected).abs() < 1e-12);
    }

    #[test]
    fn test_from_sorted_matches_of() {
        let mut values = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let a = Summary::of(values.clone()).unwrap();
        values.sort_by(f64::total_cmp);
        let b = Summary::from_sorted(&values).unwrap();
        assert_eq!(a.mean, b.mean);
        assert_eq!(a.median, b.median);
        assert_eq!(a.std_dev, b.std_dev);
    }

    #[test]
    #[should_panic(expected = "sorted in ascending order")]
    fn test_from_sorted_rejects_unsorted() {
        let _ = Summary::from_sorted(&[2.0, 1.0]);
    }
}
