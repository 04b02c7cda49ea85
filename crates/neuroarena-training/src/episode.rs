//! One training episode and validation evaluation.
//!
//! An episode is one full pass over the training set in order, taking one
//! forward + backward step per example. Evaluation is a forward-only pass
//! over the validation set that leaves the network untouched.
//!
//! Accuracy is the same in both: an example counts as correct when the
//! argmax of the output equals the argmax of the target. With a single
//! output neuron both argmaxes are always 0, so accuracy is always 1.0 for
//! such scenarios and carries no information.

use chrono::Utc;
use neuroarena_network::Architecture;
use serde::{Deserialize, Serialize};

use crate::{
    DatasetSplit, TrainingError,
    scenario::{Scenario, argmax},
    state::{EpisodeResult, TrainingState},
};

/// Validation metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    /// Mean per-example mean squared error.
    pub loss: f64,
}

/// Runs one episode over the training set, updating the network in place.
///
/// The result is numbered `current_episode + 1` but is not recorded; pass it
/// to [`TrainingState::record`] to append it to the history.
///
/// # Errors
///
/// Returns [`TrainingError::EmptyDataset`] if there is no training data.
///
/// # Panics
///
/// Panics if `architecture` does not describe the state's network.
#[expect(clippy::cast_precision_loss)]
pub fn run_episode(
    state: &mut TrainingState,
    architecture: &Architecture,
    scenario: &Scenario,
) -> Result<EpisodeResult, TrainingError> {
    if state.training_data.is_empty() {
        return Err(TrainingError::EmptyDataset {
            split: DatasetSplit::Training,
        });
    }

    let learning_rate = architecture.learning_rate();
    let mut total_loss = 0.0;
    let mut correct = 0_u32;
    for example in &state.training_data {
        let output = state.network.forward(&example.input, architecture);
        total_loss += state
            .network
            .backward(&example.target, learning_rate, architecture);
        if argmax(&output) == argmax(&example.target) {
            correct += 1;
        }
    }

    let steps = state.training_data.len();
    let n = steps as f64;
    let result = EpisodeResult {
        episode_number: state.current_episode + 1,
        accuracy: f64::from(correct) / n,
        loss: total_loss / n,
        reward: f64::from(correct),
        steps,
        timestamp: Utc::now(),
    };

    if !result.loss.is_finite() {
        log::warn!(
            "scenario `{}` episode #{}: loss is {} (learning rate {learning_rate})",
            scenario.name,
            result.episode_number,
            result.loss,
        );
    }
    log::debug!(
        "scenario `{}` episode #{}: accuracy={:.3} loss={:.4} reward={}",
        scenario.name,
        result.episode_number,
        result.accuracy,
        result.loss,
        result.reward,
    );

    Ok(result)
}

/// Measures accuracy and mean squared error on the validation set.
///
/// # Errors
///
/// Returns [`TrainingError::EmptyDataset`] if there is no validation data.
///
/// # Panics
///
/// Panics if `architecture` does not describe the state's network.
#[expect(clippy::cast_precision_loss)]
pub fn evaluate(state: &TrainingState, architecture: &Architecture) -> Result<Evaluation, TrainingError> {
    if state.validation_data.is_empty() {
        return Err(TrainingError::EmptyDataset {
            split: DatasetSplit::Validation,
        });
    }

    let mut correct = 0_u32;
    let mut total_loss = 0.0;
    for example in &state.validation_data {
        let output = state.network.predict(&example.input, architecture);
        total_loss += mean_squared_error(&output, &example.target);
        if argmax(&output) == argmax(&example.target) {
            correct += 1;
        }
    }

    let n = state.validation_data.len() as f64;
    Ok(Evaluation {
        accuracy: f64::from(correct) / n,
        loss: total_loss / n,
    })
}

/// `Σ(output[i] - target[i])² / output.len()`.
///
/// # Panics
///
/// Panics if the slices differ in length.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean_squared_error(output: &[f64], target: &[f64]) -> f64 {
    assert_eq!(output.len(), target.len());
    let sum: f64 = output
        .iter()
        .zip(target)
        .map(|(o, t)| (o - t).powi(2))
        .sum();
    sum / output.len() as f64
}
