//! Layer specifications and architecture validation.
//!
//! An [`Architecture`] is an ordered list of [`LayerSpec`]s plus the learning
//! rate used when training a network built from it. A buildable architecture
//! satisfies these constraints:
//!
//! - at least 3 layers
//! - exactly one [`LayerKind::Input`] layer, placed first
//! - exactly one [`LayerKind::Output`] layer, placed last
//! - only [`LayerKind::Hidden`] layers in between (so at least one)
//! - every layer has at least one neuron
//! - layer ids are unique (they prefix neuron ids)
//!
//! [`Architecture::validate`] checks all of them and reports the first
//! violation found.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{ActivationKind, InvalidArchitectureError};

/// Role of a layer inside an architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Input,
    Hidden,
    Output,
}

/// Specification of a single layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Unique layer id. Neuron ids are derived as `<id>_<index>`.
    pub id: String,
    pub kind: LayerKind,
    pub neuron_count: usize,
    /// Ignored for the input layer, whose activations are the raw inputs.
    pub activation: ActivationKind,
}

impl LayerSpec {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: LayerKind,
        neuron_count: usize,
        activation: ActivationKind,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            neuron_count,
            activation,
        }
    }

    /// Creates an input layer with a [`ActivationKind::Linear`] activation.
    #[must_use]
    pub fn input(id: impl Into<String>, neuron_count: usize) -> Self {
        Self::new(id, LayerKind::Input, neuron_count, ActivationKind::Linear)
    }

    #[must_use]
    pub fn hidden(id: impl Into<String>, neuron_count: usize, activation: ActivationKind) -> Self {
        Self::new(id, LayerKind::Hidden, neuron_count, activation)
    }

    #[must_use]
    pub fn output(id: impl Into<String>, neuron_count: usize, activation: ActivationKind) -> Self {
        Self::new(id, LayerKind::Output, neuron_count, activation)
    }
}

/// Ordered layer specification plus the learning rate used for training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    layers: Vec<LayerSpec>,
    learning_rate: f64,
}

impl Architecture {
    /// Creates an architecture without validating it.
    ///
    /// Validation happens in [`Self::validate`], which
    /// [`Network::build`](crate::Network::build) calls before building.
    #[must_use]
    pub fn new(layers: Vec<LayerSpec>, learning_rate: f64) -> Self {
        Self {
            layers,
            learning_rate,
        }
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Returns the first layer of the given kind, if any.
    #[must_use]
    pub fn layer_of_kind(&self, kind: LayerKind) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// Number of neurons in the input layer, or 0 if there is none.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layer_of_kind(LayerKind::Input)
            .map_or(0, |l| l.neuron_count)
    }

    /// Number of neurons in the output layer, or 0 if there is none.
    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layer_of_kind(LayerKind::Output)
            .map_or(0, |l| l.neuron_count)
    }

    /// Total number of neurons across all layers.
    #[must_use]
    pub fn neuron_count(&self) -> usize {
        self.layers.iter().map(|l| l.neuron_count).sum()
    }

    /// Number of connections of the fully connected network: `Σ n_i * n_{i+1}`.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.layers
            .windows(2)
            .map(|w| w[0].neuron_count * w[1].neuron_count)
            .sum()
    }

    /// Returns a copy with the input and output layer sizes replaced.
    ///
    /// Hidden layers and the learning rate are kept as they are.
    #[must_use]
    pub fn with_io_sizes(&self, input_size: usize, output_size: usize) -> Self {
        let layers = self
            .layers
            .iter()
            .cloned()
            .map(|mut layer| {
                match layer.kind {
                    LayerKind::Input => layer.neuron_count = input_size,
                    LayerKind::Output => layer.neuron_count = output_size,
                    LayerKind::Hidden => {}
                }
                layer
            })
            .collect();
        Self {
            layers,
            learning_rate: self.learning_rate,
        }
    }

    /// Checks that a network can be built from this architecture.
    pub fn validate(&self) -> Result<(), InvalidArchitectureError> {
        if self.layers.len() < 3 {
            return Err(InvalidArchitectureError::TooFewLayers {
                count: self.layers.len(),
            });
        }

        let count_kind = |kind| self.layers.iter().filter(|l| l.kind == kind).count();
        match count_kind(LayerKind::Input) {
            0 => return Err(InvalidArchitectureError::MissingInput),
            1 => {}
            count => return Err(InvalidArchitectureError::DuplicateInput { count }),
        }
        match count_kind(LayerKind::Output) {
            0 => return Err(InvalidArchitectureError::MissingOutput),
            1 => {}
            count => return Err(InvalidArchitectureError::DuplicateOutput { count }),
        }

        // exactly one of each exists, so these lookups succeed
        let first = &self.layers[0];
        if !first.kind.is_input() {
            let input = self.layer_of_kind(LayerKind::Input).unwrap_or(first);
            return Err(InvalidArchitectureError::MisplacedInput {
                layer_id: input.id.clone(),
            });
        }
        let last = &self.layers[self.layers.len() - 1];
        if !last.kind.is_output() {
            let output = self.layer_of_kind(LayerKind::Output).unwrap_or(last);
            return Err(InvalidArchitectureError::MisplacedOutput {
                layer_id: output.id.clone(),
            });
        }

        if let Some(layer) = self.layers.iter().find(|l| l.neuron_count == 0) {
            return Err(InvalidArchitectureError::EmptyLayer {
                layer_id: layer.id.clone(),
            });
        }

        let mut seen = HashSet::new();
        for layer in &self.layers {
            if !seen.insert(layer.id.as_str()) {
                return Err(InvalidArchitectureError::DuplicateLayerId {
                    layer_id: layer.id.clone(),
                });
            }
        }

        Ok(())
    }
}
