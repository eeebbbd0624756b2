/// Precomputed percentile values for a sample.
///
/// # Examples
///
/// ```
/// use pendulum_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(6.0));
/// assert_eq!(percentiles.get(25.0), Some(3.0));
/// assert_eq!(percentiles.get(90.0), None);
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    /// `(percentile, value)` pairs in the order they were requested.
    values: Vec<(f32, f32)>,
}

impl Percentiles {
    /// Computes percentiles from values sorted in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32], percentile_points: &[f32]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Computes percentiles from unsorted values.
    #[must_use]
    pub fn new(values: &[f32], percentile_points: &[f32]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f32::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a precomputed percentile.
    #[must_use]
    pub fn get(&self, percentile: f32) -> Option<f32> {
        self.values
            .iter()
            .find(|(p, _)| (*p - percentile).abs() < f32::EPSILON)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.values.iter().copied()
    }
}

/// Computes a single percentile with the nearest-rank method.
///
/// For `n` sorted values the k-th percentile is the value at index
/// `floor(n * k / 100)`, clamped to the last element. Returns `f32::NAN` for an
/// empty slice.
///
/// ```
/// use pendulum_stats::percentiles::compute_percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_percentile(&values, 50.0), 3.0);
/// assert_eq!(compute_percentile(&values, 100.0), 5.0);
/// assert!(compute_percentile(&[], 50.0).is_nan());
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f32], percentile: f32) -> f32 {
    if sorted_values.is_empty() {
        return f32::NAN;
    }
    let idx = ((sorted_values.len() as f32 * percentile) / 100.0) as usize;
    let idx = idx.min(sorted_values.len() - 1);
    sorted_values[idx]
}
