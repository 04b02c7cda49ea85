use chrono::{DateTime, Utc};
use neuroarena_network::{Architecture, Network, Seed};
use neuroarena_training::scenario::Scenario;
use serde::{Deserialize, Serialize};

/// A trained network together with what it was trained on.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainedModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub scenario: Scenario,
    /// Architecture fitted to the scenario, describing `network`.
    pub architecture: Architecture,
    pub seed: Seed,
    /// Training accuracy of the last episode.
    pub final_accuracy: f64,
    pub validation_accuracy: f64,
    pub episodes: usize,
    pub network: Network,
}
