use neuroarena_network::{ActivationKind, Architecture, LayerSpec, Seed};
use neuroarena_training::scenario::{Scenario, ScenarioKind};
use serde::{Deserialize, Serialize};

const DEFAULT_EPISODES: usize = 50;

/// Settings of one training run, loadable from JSON.
///
/// Missing fields fall back to the classification preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub architecture: Architecture,
    pub scenario: Scenario,
    pub episodes: usize,
    pub seed: Option<Seed>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::preset(ScenarioKind::Classification)
    }
}

impl RunConfig {
    /// Built-in setup for each scenario kind.
    ///
    /// Input and output layer sizes already match the scenario.
    pub fn preset(kind: ScenarioKind) -> Self {
        let scenario = Scenario::preset(kind);
        let (hidden, hidden_activation, output_activation, learning_rate) = match kind {
            ScenarioKind::Classification => (vec![4], ActivationKind::ReLU, ActivationKind::Sigmoid, 0.01),
            ScenarioKind::Maze | ScenarioKind::Game => {
                (vec![12, 8], ActivationKind::LeakyReLU, ActivationKind::Sigmoid, 0.05)
            }
            ScenarioKind::Pattern => (vec![8], ActivationKind::Tanh, ActivationKind::Sigmoid, 0.05),
            ScenarioKind::Optimization => (vec![8], ActivationKind::Tanh, ActivationKind::Linear, 0.02),
            ScenarioKind::Freeform => (vec![6], ActivationKind::ReLU, ActivationKind::Sigmoid, 0.01),
        };
        Self {
            architecture: layered_architecture(
                scenario.input_size,
                &hidden,
                hidden_activation,
                scenario.output_size,
                output_activation,
                learning_rate,
            ),
            scenario,
            episodes: DEFAULT_EPISODES,
            seed: None,
        }
    }
}

/// An architecture with one hidden layer per entry of `hidden`.
///
/// Layers are named `input`, `hidden`, `hidden2`, ..., `output`, so networks
/// that share a prefix of hidden layers also share neuron ids.
pub fn layered_architecture(
    input_size: usize,
    hidden: &[usize],
    hidden_activation: ActivationKind,
    output_size: usize,
    output_activation: ActivationKind,
    learning_rate: f64,
) -> Architecture {
    let mut layers = vec![LayerSpec::input("input", input_size)];
    for (i, &count) in hidden.iter().enumerate() {
        let id = if i == 0 {
            "hidden".to_owned()
        } else {
            format!("hidden{}", i + 1)
        };
        layers.push(LayerSpec::hidden(id, count, hidden_activation));
    }
    layers.push(LayerSpec::output("output", output_size, output_activation));
    Architecture::new(layers, learning_rate)
}
