//! Statistical helpers shared by the training engine and the command line tools.
//!
//! - [`descriptive`]: summary statistics (mean, spread, range) over `f32` samples
//! - [`outliers`]: the outlier-trimmed mean used to aggregate noisy trial scores
//!
//! # Examples
//!
//! ```
//! use flapevo_stats::{descriptive::DescriptiveStats, outliers::trimmed_mean};
//!
//! let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert_eq!(stats.mean, 3.0);
//!
//! let fitness = trimmed_mean(&[10.0, 11.0, 9.0, 10.0, 200.0], 2.0).unwrap();
//! assert_eq!(fitness, 10.0);
//! ```

pub mod descriptive;
pub mod outliers;
