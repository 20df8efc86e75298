//! Outlier-resistant aggregation of noisy samples.
//!
//! Episode scores from a stochastic environment occasionally contain a
//! catastrophic or lucky run far away from the rest. [`trimmed_mean`] drops
//! such values before averaging, but only when the sample is large enough for
//! its standard deviation to be meaningful.
//!
//! With `n` samples no single value can lie more than `sqrt(n - 1)` population
//! standard deviations from the mean, so a 2σ cut around the mean never fires
//! for five samples or fewer. From [`MEDIAN_CENTER_MIN_SAMPLES`] on, distances
//! are measured from the median, which the outlier cannot drag along. Smaller
//! samples keep the mean as the center, so three or four trials are averaged
//! as they are.

use crate::descriptive::{DescriptiveStats, mean};

/// Minimum sample size for which outliers are trimmed.
pub const MIN_TRIM_SAMPLES: usize = 3;

/// Minimum sample size for which distances are measured from the median.
pub const MEDIAN_CENTER_MIN_SAMPLES: usize = 5;

/// Averages `values` after discarding those more than `k` (population)
/// standard deviations away from the center of the sample.
///
/// The center is the median for at least [`MEDIAN_CENTER_MIN_SAMPLES`] values
/// and the mean below that.
///
/// - Fewer than [`MIN_TRIM_SAMPLES`] values, or zero spread: plain mean.
/// - If trimming would discard every value, the plain mean of all values is
///   returned instead.
///
/// Returns `None` only for an empty sample.
///
/// # Examples
///
/// ```
/// # use flapevo_stats::outliers::trimmed_mean;
/// // 200 lies more than 2 std devs (~76) from the median (10)
/// assert_eq!(trimmed_mean(&[10.0, 11.0, 9.0, 10.0, 200.0], 2.0), Some(10.0));
/// // two samples are never trimmed
/// assert_eq!(trimmed_mean(&[0.0, 100.0], 2.0), Some(50.0));
/// ```
#[must_use]
pub fn trimmed_mean(values: &[f32], k: f32) -> Option<f32> {
    let stats = DescriptiveStats::from_slice(values)?;
    if values.len() < MIN_TRIM_SAMPLES || stats.std_dev <= 0.0 {
        return Some(stats.mean);
    }

    let center = if values.len() >= MEDIAN_CENTER_MIN_SAMPLES {
        stats.median
    } else {
        stats.mean
    };
    let limit = k * stats.std_dev;
    let kept = values
        .iter()
        .copied()
        .filter(|v| (v - center).abs() <= limit)
        .collect::<Vec<_>>();
    mean(&kept).or(Some(stats.mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(trimmed_mean(&[], 2.0), None);
    }

    #[test]
    fn test_outlier_is_discarded() {
        let fitness = trimmed_mean(&[10.0, 11.0, 9.0, 10.0, 200.0], 2.0).unwrap();
        assert!((fitness - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_small_sample_is_not_trimmed() {
        assert_eq!(trimmed_mean(&[1.0, 1000.0], 2.0), Some(500.5));
        assert_eq!(trimmed_mean(&[4.0], 2.0), Some(4.0));
    }

    #[test]
    fn test_identical_scores() {
        assert_eq!(trimmed_mean(&[7.0, 7.0, 7.0], 2.0), Some(7.0));
    }

    #[test]
    fn test_values_within_bound_are_kept() {
        // mean 2, std ~0.816; nothing is farther than 2 std devs
        assert_eq!(trimmed_mean(&[1.0, 2.0, 3.0], 2.0), Some(2.0));
    }

    #[test]
    fn test_lucky_trial_is_kept_in_small_samples() {
        for sample in [
            [3.0, 3.0, 15.0],
            [9.0, 10.0, 30.0],
            [20.0, 21.0, 40.0],
            [0.0, 0.0, 10.0],
        ] {
            let plain = mean(&sample).unwrap();
            let fitness = trimmed_mean(&sample, 2.0).unwrap();
            assert!((fitness - plain).abs() < 1e-5, "{sample:?}: {fitness}");
        }
        let fitness = trimmed_mean(&[5.0, 5.0, 5.0, 45.0], 2.0).unwrap();
        assert!((fitness - 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_low_outlier_is_discarded() {
        let scores = [0.0, 50.0, 52.0, 48.0, 50.0, 50.0];
        let fitness = trimmed_mean(&scores, 2.0).unwrap();
        assert!((fitness - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_falls_back_to_full_mean_when_everything_is_trimmed() {
        // the mean 2.0 is not itself a sample, so k = 0 drops everything
        assert_eq!(trimmed_mean(&[0.0, 1.0, 3.0, 4.0], 0.0), Some(2.0));
    }
}
