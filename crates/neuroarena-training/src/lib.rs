//! Episodic training, evaluation, and comparison of arena networks.
//!
//! This crate drives [`neuroarena_network`] networks through synthetic
//! scenarios. It owns everything above a single forward/backward step:
//! generating labeled data, running episodes, measuring training health,
//! pitting two networks against each other, and transferring weights between
//! architectures.
//!
//! # Architecture
//!
//! ```text
//! Scenario ──generate──→ 100 examples ──split 80/20──→ TrainingState
//!                                                         │
//! Architecture ──fit to scenario──→ Network::build ───────┘
//!
//! TrainingState ──run_episode──→ EpisodeResult ──record──→ episode history
//!               ──evaluate────→ Evaluation (validation set, forward only)
//!
//! episode history ──convergence──→ convergence score
//! train/val accuracy ──overfitting_risk──→ overfitting risk
//!
//! Network × Network ──battle──→ BattleResult
//! Network × Architecture ──transfer_weights──→ Network
//! ```
//!
//! # Modules
//!
//! - [`scenario`] - Scenario definitions and the labeled data generator
//! - [`state`] - [`TrainingState`], [`EpisodeResult`], and [`initialize_training`]
//! - [`episode`] - One training episode and validation evaluation
//! - [`health`] - Overfitting-risk and convergence heuristics
//! - [`battle`] - Head-to-head comparison of two networks
//! - [`transfer`] - Partial weight transfer between architectures
//! - [`session`] - [`TrainingSession`], a seeded facade that steps all of the above
//!
//! # Stepping Model
//!
//! Nothing in this crate schedules itself. A caller (a UI loop, the CLI)
//! invokes one episode at a time; stopping is simply not calling again.
//!
//! # Two Loss Units
//!
//! Training loss is the mean per-example *summed absolute* output error (the
//! value returned by the backward pass). Validation loss is the mean
//! per-example *mean squared* error. The two are intentionally not unified and
//! are not directly comparable.
//!
//! # Example
//!
//! ```
//! use neuroarena_network::Seed;
//! use neuroarena_training::{TrainingSession, scenario::{Scenario, ScenarioKind}};
//!
//! let scenario = Scenario::preset(ScenarioKind::Classification);
//! let architecture = neuroarena_training::default_architecture();
//! let mut session = TrainingSession::new(scenario, &architecture, Seed::from_u64(1)).unwrap();
//!
//! for _ in 0..5 {
//!     session.step().unwrap();
//! }
//! assert_eq!(session.state().episodes().len(), 5);
//! assert_eq!(session.state().total_steps(), 5 * 80);
//! ```

use neuroarena_network::{ActivationKind, Architecture, InvalidArchitectureError, LayerSpec};

pub use self::{
    battle::{BattleResult, BattleWinner, battle},
    episode::{Evaluation, evaluate, run_episode},
    health::{convergence, overfitting_risk},
    scenario::{Scenario, ScenarioKind, TrainingExample, generate},
    session::TrainingSession,
    state::{EpisodeResult, TrainingState, initialize_training},
    transfer::transfer_weights,
};

pub mod battle;
pub mod episode;
pub mod health;
pub mod scenario;
pub mod session;
pub mod state;
pub mod transfer;

/// Which half of the 80/20 split a dataset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum DatasetSplit {
    #[display("training")]
    Training,
    #[display("validation")]
    Validation,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid architecture: {_0}")]
    #[from]
    InvalidArchitecture(InvalidArchitectureError),
    #[display("{split} dataset is empty")]
    EmptyDataset { split: DatasetSplit },
    #[display("invalid scenario `{scenario}`: {reason}")]
    InvalidScenario { scenario: String, reason: String },
}

/// The 2 → 4 (`ReLU`) → 1 (sigmoid) architecture with learning rate 0.01.
///
/// Input and output sizes are rewritten to match the scenario when training
/// starts, so this works as a starting point for any scenario.
#[must_use]
pub fn default_architecture() -> Architecture {
    Architecture::new(
        vec![
            LayerSpec::input("input", 2),
            LayerSpec::hidden("hidden", 4, ActivationKind::ReLU),
            LayerSpec::output("output", 1, ActivationKind::Sigmoid),
        ],
        0.01,
    )
}
