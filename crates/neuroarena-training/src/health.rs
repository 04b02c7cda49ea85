//! Training-health heuristics derived from the episode history.
//!
//! Both estimators are step functions over a handful of constants, kept here
//! as tables so they can be read and tested without running any training.

use neuroarena_stats::descriptive;

use crate::state::EpisodeResult;

/// `(gap upper bound, risk)` pairs, checked in order. The first row whose
/// bound is strictly greater than the train/validation gap wins.
pub const OVERFITTING_RISK_TABLE: [(f64, f64); 3] = [(0.05, 0.1), (0.15, 0.3), (0.25, 0.6)];

/// Risk reported when the gap exceeds every row of [`OVERFITTING_RISK_TABLE`].
pub const MAX_OVERFITTING_RISK: f64 = 0.9;

/// Number of trailing episodes inspected by [`convergence`].
pub const DEFAULT_CONVERGENCE_WINDOW: usize = 10;

/// Accuracy variance is multiplied by this before being capped at 1.
pub const CONVERGENCE_VARIANCE_SCALE: f64 = 10.0;

/// Estimates overfitting risk from the gap between training and validation accuracy.
///
/// The result is always one of 0.1, 0.3, 0.6, or 0.9. A negative gap
/// (validation ahead of training) counts as the lowest risk.
///
/// ```
/// # use neuroarena_training::overfitting_risk;
/// assert_eq!(overfitting_risk(0.50, 0.48), 0.1);
/// assert_eq!(overfitting_risk(0.95, 0.50), 0.9);
/// ```
#[must_use]
pub fn overfitting_risk(train_accuracy: f64, validation_accuracy: f64) -> f64 {
    let gap = train_accuracy - validation_accuracy;
    OVERFITTING_RISK_TABLE
        .iter()
        .find(|(bound, _)| gap < *bound)
        .map_or(MAX_OVERFITTING_RISK, |(_, risk)| *risk)
}

/// Scores how stable accuracy has been over the last `window` episodes.
///
/// Returns 0 until at least `window` episodes exist (and always for a zero
/// window). Otherwise returns `1 - min(variance * 10, 1)` where `variance` is
/// the population variance of the trailing accuracies, so the score lies in
/// `[0, 1]` and is 1 for perfectly flat accuracy.
#[must_use]
pub fn convergence(episodes: &[EpisodeResult], window: usize) -> f64 {
    if window == 0 || episodes.len() < window {
        return 0.0;
    }
    let recent = &episodes[episodes.len() - window..];
    let Some(variance) = descriptive::variance(recent.iter().map(|e| e.accuracy)) else {
        return 0.0;
    };
    1.0 - f64::min(variance * CONVERGENCE_VARIANCE_SCALE, 1.0)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn history(accuracies: &[f64]) -> Vec<EpisodeResult> {
        accuracies
            .iter()
            .enumerate()
            .map(|(i, &accuracy)| EpisodeResult {
                episode_number: i + 1,
                accuracy,
                loss: 0.0,
                reward: 0.0,
                steps: 80,
                timestamp: Utc::now(),
            })
            .collect()
    }

    mod overfitting {
        use super::*;

        #[test]
        fn test_each_band() {
            assert_eq!(overfitting_risk(0.50, 0.48), 0.1);
            assert_eq!(overfitting_risk(0.70, 0.60), 0.3);
            assert_eq!(overfitting_risk(0.90, 0.70), 0.6);
            assert_eq!(overfitting_risk(0.95, 0.50), 0.9);
            // gaps near 0.2 and 0.3 land in the upper two bands
            assert_eq!(overfitting_risk(0.70, 0.50), 0.6);
            assert_eq!(overfitting_risk(0.90, 0.60), 0.9);
        }

        #[test]
        fn test_bounds_are_exclusive() {
            // a gap exactly on a bound falls into the next band
            assert_eq!(overfitting_risk(0.25, 0.0), 0.9);
            assert_eq!(overfitting_risk(0.5, 0.5), 0.1);
        }

        #[test]
        fn test_negative_gap_is_low_risk() {
            assert_eq!(overfitting_risk(0.2, 0.9), 0.1);
        }

        #[test]
        fn test_nan_gap_is_max_risk() {
            assert_eq!(overfitting_risk(f64::NAN, 0.5), MAX_OVERFITTING_RISK);
        }
    }

    mod convergence {
        use super::*;

        #[test]
        fn test_short_history_scores_zero() {
            for n in 0..DEFAULT_CONVERGENCE_WINDOW {
                let episodes = history(&vec![0.5; n]);
                assert_eq!(convergence(&episodes, DEFAULT_CONVERGENCE_WINDOW), 0.0);
            }
        }

        #[test]
        fn test_zero_window_scores_zero() {
            assert_eq!(convergence(&history(&[0.5, 0.5]), 0), 0.0);
        }

        #[test]
        fn test_flat_accuracy_fully_converged() {
            let episodes = history(&[0.8; 12]);
            assert_eq!(convergence(&episodes, DEFAULT_CONVERGENCE_WINDOW), 1.0);
        }

        #[test]
        fn test_only_trailing_window_counts() {
            let mut accuracies = vec![0.0, 1.0, 0.0, 1.0];
            accuracies.extend([0.6; 10]);
            assert_eq!(convergence(&history(&accuracies), 10), 1.0);
        }

        #[test]
        fn test_scaled_variance() {
            // population variance of alternating 0.4/0.6 is 0.01
            let accuracies = [0.4, 0.6].repeat(5);
            let score = convergence(&history(&accuracies), 10);
            assert!((score - 0.9).abs() < 1e-9, "score={score}");
        }

        #[test]
        fn test_large_variance_is_capped() {
            let accuracies = [0.0, 1.0].repeat(5);
            assert_eq!(convergence(&history(&accuracies), 10), 0.0);
        }
    }
}
