use serde::{Deserialize, Serialize};

/// Descriptive statistics summarizing a sample of `f32` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of values in the sample.
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    /// Middle value; the mean of the two middle values for even-sized samples.
    pub median: f32,
    /// Population variance.
    pub variance: f32,
    pub std_dev: f32,
    /// `std_dev / (max - min)`, or `0.0` for a degenerate range.
    pub normalized_std_dev: f32,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// Returns `None` if the sample is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pendulum_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    ///
    /// assert!(DescriptiveStats::new(Vec::<f32>::new()).is_none());
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from values sorted in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f32;
        let mean = sorted_values.iter().copied().sum::<f32>() / n;
        let median = if count % 2 == 0 {
            f32::midpoint(sorted_values[count / 2 - 1], sorted_values[count / 2])
        } else {
            sorted_values[count / 2]
        };
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;
        let std_dev = variance.sqrt();
        // relative epsilon so near-constant samples of any scale count as degenerate
        let normalized_std_dev = if (max - min).abs() <= mean.abs() * f32::EPSILON {
            0.0
        } else {
            std_dev / (max - min)
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
            normalized_std_dev,
        })
    }
}
