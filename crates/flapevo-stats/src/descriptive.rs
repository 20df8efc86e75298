/// Summary statistics of an `f32` sample.
///
/// Variance and standard deviation are population statistics (divided by `n`),
/// which is also what the outlier filter in [`crate::outliers`] relies on.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    /// Number of values in the sample.
    pub count: usize,
    /// The minimum value.
    pub min: f32,
    /// The maximum value.
    pub max: f32,
    /// The arithmetic mean.
    pub mean: f32,
    /// The median (midpoint of the two central values for even-sized samples).
    pub median: f32,
    /// The population variance.
    pub variance: f32,
    /// The population standard deviation.
    pub std_dev: f32,
    /// Standard deviation relative to the range (`std_dev / (max - min)`).
    ///
    /// Zero when every value is the same. Used to gauge how far a population
    /// has converged on one gene.
    pub normalized_std_dev: f32,
}

impl DescriptiveStats {
    /// Computes statistics over the given values.
    ///
    /// The values are collected and sorted internally. Returns `None` for an
    /// empty sample.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flapevo_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert!(DescriptiveStats::new(Vec::new()).is_none());
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

    /// Like [`Self::new`], but borrows the sample.
    #[must_use]
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        Self::new(values.iter().copied())
    }

    /// Computes statistics from values sorted in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted.
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
        let mean = sorted_values.iter().sum::<f32>() / n;
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
        // relative epsilon so that large-magnitude samples with a tiny range count as flat
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

/// Arithmetic mean of a sample, `None` when empty.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}

/// Element-wise mean of equally long vectors.
///
/// Returns a vector of `len` zeros when there is nothing to average.
///
/// # Panics
///
/// Panics if any vector is not `len` elements long.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn elementwise_mean<'a, I>(vectors: I, len: usize) -> Vec<f32>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut sum = vec![0.0; len];
    let mut count = 0_usize;
    for v in vectors {
        assert_eq!(v.len(), len, "vector length mismatch");
        for (s, x) in sum.iter_mut().zip(v) {
            *s += x;
        }
        count += 1;
    }
    if count > 0 {
        let n = count as f32;
        for s in &mut sum {
            *s /= n;
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std_dev() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-6);
        assert!((stats.variance - 4.0).abs() < 1e-6);
        assert!((stats.std_dev - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_median() {
        let odd = DescriptiveStats::new([3.0, 1.0, 2.0]).unwrap();
        assert_eq!(odd.median, 2.0);
        let even = DescriptiveStats::new([4.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(even.median, 2.5);
    }

    #[test]
    fn test_flat_sample_has_zero_normalized_std_dev() {
        let stats = DescriptiveStats::new([3.0; 4]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.normalized_std_dev, 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_elementwise_mean() {
        let a = [1.0, 2.0];
        let b = [3.0, -2.0];
        assert_eq!(elementwise_mean([&a[..], &b[..]], 2), vec![2.0, 0.0]);
        assert_eq!(elementwise_mean(std::iter::empty(), 3), vec![0.0; 3]);
    }
}
