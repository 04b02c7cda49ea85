//! Statistical helpers for training analysis.
//!
//! - [`descriptive`]: min, max, mean, median, variance, and standard deviation
//!   of a sample, used by the convergence heuristic and training reports.
//!
//! # Example
//!
//! ```
//! use neuroarena_stats::descriptive::DescriptiveStats;
//!
//! let accuracies = [0.5, 0.6, 0.7];
//! let stats = DescriptiveStats::new(accuracies).unwrap();
//! assert!((stats.mean - 0.6).abs() < 1e-12);
//! ```

pub mod descriptive;
