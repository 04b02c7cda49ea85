use chrono::{DateTime, Utc};
use neuroarena_network::{Architecture, Network};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    TrainingError,
    scenario::{self, Scenario, TrainingExample},
};

/// Number of examples generated when training starts.
pub const DATASET_SIZE: usize = 100;

/// Number of leading examples used for training; the rest validate.
pub const TRAINING_SPLIT: usize = 80;

/// Outcome of one pass over the training set. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// 1-based episode number.
    pub episode_number: usize,
    /// Fraction of training examples whose output argmax matched the target argmax.
    pub accuracy: f64,
    /// Mean per-example summed absolute output error.
    pub loss: f64,
    /// One point per correct example.
    pub reward: f64,
    /// Number of train steps taken (the training set size).
    pub steps: usize,
    pub timestamp: DateTime<Utc>,
}

/// Training progress for one (scenario, architecture) pair.
///
/// The network shape and the data split are fixed when the state is created.
/// The episode history only grows; starting over means building a new state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingState {
    pub(crate) architecture: Architecture,
    pub(crate) network: Network,
    pub(crate) training_data: Vec<TrainingExample>,
    pub(crate) validation_data: Vec<TrainingExample>,
    pub(crate) episodes: Vec<EpisodeResult>,
    pub(crate) current_episode: usize,
    pub(crate) total_steps: usize,
    pub(crate) best_accuracy: f64,
    pub(crate) convergence_score: f64,
    pub(crate) overfitting_risk: f64,
}

/// Fits `architecture` to `scenario`, builds its network, and generates the data split.
///
/// The input and output layer sizes of `architecture` are replaced by the
/// scenario's sizes before building; the fitted architecture is kept in the
/// returned state (see [`TrainingState::architecture`]) and is the one to pass
/// to [`run_episode`](crate::episode::run_episode).
///
/// [`DATASET_SIZE`] examples are generated at the scenario's variance. The
/// first [`TRAINING_SPLIT`] become training data and the rest validation
/// data, in generation order.
///
/// # Errors
///
/// Returns [`TrainingError::InvalidScenario`] or
/// [`TrainingError::InvalidArchitecture`] if either input cannot be used.
pub fn initialize_training<R>(
    scenario: &Scenario,
    architecture: &Architecture,
    rng: &mut R,
) -> Result<TrainingState, TrainingError>
where
    R: Rng + ?Sized,
{
    scenario.validate()?;
    let architecture = architecture.with_io_sizes(scenario.input_size, scenario.output_size);
    let network = Network::build(&architecture, rng)?;

    let mut training_data = scenario::generate(scenario, DATASET_SIZE, scenario.variance, rng)?;
    let validation_data = training_data.split_off(TRAINING_SPLIT);

    log::info!(
        "initialized training for scenario `{}` ({}): {} neurons, {} connections, {} training / {} validation examples",
        scenario.name,
        scenario.kind,
        network.neuron_count(),
        network.connection_count(),
        training_data.len(),
        validation_data.len(),
    );

    Ok(TrainingState::new(
        architecture,
        network,
        training_data,
        validation_data,
    ))
}

impl TrainingState {
    /// Creates a state with an empty history from pre-built parts.
    #[must_use]
    pub fn new(
        architecture: Architecture,
        network: Network,
        training_data: Vec<TrainingExample>,
        validation_data: Vec<TrainingExample>,
    ) -> Self {
        Self {
            architecture,
            network,
            training_data,
            validation_data,
            episodes: vec![],
            current_episode: 0,
            total_steps: 0,
            best_accuracy: 0.0,
            convergence_score: 0.0,
            overfitting_risk: 0.0,
        }
    }

    /// The architecture the network was built from, fitted to the scenario.
    #[must_use]
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn training_data(&self) -> &[TrainingExample] {
        &self.training_data
    }

    #[must_use]
    pub fn validation_data(&self) -> &[TrainingExample] {
        &self.validation_data
    }

    #[must_use]
    pub fn episodes(&self) -> &[EpisodeResult] {
        &self.episodes
    }

    #[must_use]
    pub fn latest_episode(&self) -> Option<&EpisodeResult> {
        self.episodes.last()
    }

    /// Number of the last recorded episode, 0 before any.
    #[must_use]
    pub fn current_episode(&self) -> usize {
        self.current_episode
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    #[must_use]
    pub fn best_accuracy(&self) -> f64 {
        self.best_accuracy
    }

    #[must_use]
    pub fn convergence_score(&self) -> f64 {
        self.convergence_score
    }

    #[must_use]
    pub fn overfitting_risk(&self) -> f64 {
        self.overfitting_risk
    }

    /// Appends an episode to the history and updates the running counters.
    ///
    /// Returns `true` if the episode set a new best accuracy.
    pub fn record(&mut self, result: EpisodeResult) -> bool {
        self.current_episode = result.episode_number;
        self.total_steps += result.steps;
        let improved = result.accuracy > self.best_accuracy;
        if improved {
            self.best_accuracy = result.accuracy;
        }
        self.episodes.push(result);
        improved
    }

    /// Stores the latest health heuristics.
    pub fn set_health(&mut self, convergence_score: f64, overfitting_risk: f64) {
        self.convergence_score = convergence_score;
        self.overfitting_risk = overfitting_risk;
    }
}
