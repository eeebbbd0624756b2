//! Summary statistics for rollout scores and fitness values.
//!
//! - [`descriptive`]: min / max / mean / median / spread of a sample
//! - [`percentiles`]: nearest-rank percentile lookup
//!
//! # Examples
//!
//! ```
//! use pendulum_stats::descriptive::DescriptiveStats;
//!
//! let scores = [-120.0, -80.0, -95.0, -60.0];
//! let stats = DescriptiveStats::new(scores).unwrap();
//! assert_eq!(stats.max, -60.0);
//! assert_eq!(stats.median, -87.5);
//! ```
//!
//! ```
//! use pendulum_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```

pub mod descriptive;
pub mod percentiles;
