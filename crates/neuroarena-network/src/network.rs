//! Neurons, connections, and the Xavier-initialized network.
//!
//! A [`Network`] is built once from an [`Architecture`] and never changes
//! shape afterwards: the set of neurons and connections is fixed for its
//! lifetime, only their numeric state (activations, deltas, weights, biases)
//! is mutated by the propagation engine.
//!
//! # Initialization
//!
//! - Every neuron (input layer included) gets `bias ~ U(-0.05, 0.05)`.
//! - Every pair of adjacent layers is fully connected. Each connection gets
//!   `weight ~ U(-L, L)` with `L = sqrt(6 / (fan_in + fan_out))`
//!   (Xavier/Glorot uniform), where `fan_in` and `fan_out` are the neuron
//!   counts of the previous and current layer.
//!
//! # Identifiers
//!
//! Neuron ids are `<layer_id>_<index>` and connection ids are
//! `<from_id>_<to_id>`. They are stable across networks built from
//! architectures that share layer ids, which is what
//! [`Network::copy_matching_parameters`] relies on.

use std::{collections::HashMap, ops::Range};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Architecture, InvalidArchitectureError, InvalidNetworkError, LayerKind};

/// Half-width of the uniform distribution biases are drawn from.
pub const BIAS_INIT_RANGE: f64 = 0.05;

/// Returns the Xavier/Glorot uniform limit for a layer pair.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn xavier_limit(fan_in: usize, fan_out: usize) -> f64 {
    (6.0 / (fan_in + fan_out) as f64).sqrt()
}

/// Position of a neuron inside a network: layer index and index within the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeuronRef {
    pub layer: usize,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    id: String,
    layer_id: String,
    pre_activation_sum: f64,
    activation: f64,
    bias: f64,
    delta: f64,
}

impl Neuron {
    fn new(layer_id: &str, index: usize, bias: f64) -> Self {
        Self {
            id: format!("{layer_id}_{index}"),
            layer_id: layer_id.to_owned(),
            pre_activation_sum: 0.0,
            activation: 0.0,
            bias,
            delta: 0.0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Weighted input sum (bias included) from the last forward pass.
    #[must_use]
    pub fn pre_activation_sum(&self) -> f64 {
        self.pre_activation_sum
    }

    /// Output of the neuron from the last forward pass.
    #[must_use]
    pub fn activation(&self) -> f64 {
        self.activation
    }

    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Error signal from the last backward pass. Always 0 for input neurons.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub(crate) fn set_forward_state(&mut self, pre_activation_sum: f64, activation: f64) {
        self.pre_activation_sum = pre_activation_sum;
        self.activation = activation;
    }

    pub(crate) fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }

    pub(crate) fn add_to_bias(&mut self, amount: f64) {
        self.bias += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    id: String,
    from_neuron_id: String,
    to_neuron_id: String,
    from: NeuronRef,
    to: NeuronRef,
    weight: f64,
    gradient: f64,
}

impl Connection {
    fn new(from_neuron: &Neuron, from: NeuronRef, to_neuron: &Neuron, to: NeuronRef, weight: f64) -> Self {
        Self {
            id: format!("{}_{}", from_neuron.id, to_neuron.id),
            from_neuron_id: from_neuron.id.clone(),
            to_neuron_id: to_neuron.id.clone(),
            from,
            to,
            weight,
            gradient: 0.0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn from_neuron_id(&self) -> &str {
        &self.from_neuron_id
    }

    #[must_use]
    pub fn to_neuron_id(&self) -> &str {
        &self.to_neuron_id
    }

    /// Position of the neuron this connection reads from.
    #[must_use]
    pub fn source(&self) -> NeuronRef {
        self.from
    }

    /// Position of the neuron this connection feeds into.
    #[must_use]
    pub fn target(&self) -> NeuronRef {
        self.to
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// `from.activation * to.delta` from the last backward pass.
    #[must_use]
    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    pub(crate) fn apply_gradient(&mut self, gradient: f64, learning_rate: f64) {
        self.gradient = gradient;
        self.weight += learning_rate * gradient;
    }
}

/// Neurons of one layer, in index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLayer {
    id: String,
    kind: LayerKind,
    neurons: Vec<Neuron>,
}

impl NetworkLayer {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    #[must_use]
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }
}

/// Counts of parameters copied by [`Network::copy_matching_parameters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParameterTransfer {
    pub weights: usize,
    pub biases: usize,
}

/// A fully connected feed-forward network.
///
/// Connections are stored grouped by destination layer, and within a layer
/// by destination neuron, so the incoming connections of every layer form a
/// contiguous range. Deserialization rejects data that breaks this layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkData")]
pub struct Network {
    layers: Vec<NetworkLayer>,
    connections: Vec<Connection>,
}

#[derive(Deserialize)]
struct NetworkData {
    layers: Vec<NetworkLayer>,
    connections: Vec<Connection>,
}

impl TryFrom<NetworkData> for Network {
    type Error = InvalidNetworkError;

    fn try_from(data: NetworkData) -> Result<Self, Self::Error> {
        let NetworkData {
            layers,
            connections,
        } = data;
        let network = Self {
            layers,
            connections,
        };
        network.check_connections()?;
        Ok(network)
    }
}

impl Network {
    /// Builds a randomly initialized network from an architecture.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArchitectureError`] if the architecture fails
    /// [`Architecture::validate`]. No partial network is produced.
    ///
    /// # Example
    ///
    /// ```
    /// use neuroarena_network::{ActivationKind, Architecture, LayerSpec, Network, Seed};
    ///
    /// let architecture = Architecture::new(
    ///     vec![
    ///         LayerSpec::input("in", 3),
    ///         LayerSpec::hidden("h", 5, ActivationKind::Tanh),
    ///         LayerSpec::output("out", 2, ActivationKind::Sigmoid),
    ///     ],
    ///     0.05,
    /// );
    /// let network = Network::build(&architecture, &mut Seed::from_u64(1).rng()).unwrap();
    /// assert_eq!(network.connection_count(), 3 * 5 + 5 * 2);
    /// assert!(network.connection("in_0", "h_4").is_some());
    /// ```
    pub fn build<R>(architecture: &Architecture, rng: &mut R) -> Result<Self, InvalidArchitectureError>
    where
        R: Rng + ?Sized,
    {
        architecture.validate()?;

        let mut layers: Vec<NetworkLayer> = Vec::with_capacity(architecture.layers().len());
        let mut connections = Vec::with_capacity(architecture.connection_count());
        for (layer_index, spec) in architecture.layers().iter().enumerate() {
            let neurons: Vec<Neuron> = (0..spec.neuron_count)
                .map(|i| {
                    let bias = rng.random_range(-BIAS_INIT_RANGE..BIAS_INIT_RANGE);
                    Neuron::new(&spec.id, i, bias)
                })
                .collect();

            if let Some(prev) = layers.last() {
                let limit = xavier_limit(prev.neurons.len(), neurons.len());
                for (to_index, to_neuron) in neurons.iter().enumerate() {
                    for (from_index, from_neuron) in prev.neurons.iter().enumerate() {
                        let weight = rng.random_range(-limit..limit);
                        connections.push(Connection::new(
                            from_neuron,
                            NeuronRef {
                                layer: layer_index - 1,
                                index: from_index,
                            },
                            to_neuron,
                            NeuronRef {
                                layer: layer_index,
                                index: to_index,
                            },
                            weight,
                        ));
                    }
                }
            }

            layers.push(NetworkLayer {
                id: spec.id.clone(),
                kind: spec.kind,
                neurons,
            });
        }

        Ok(Self {
            layers,
            connections,
        })
    }

    #[must_use]
    pub fn layers(&self) -> &[NetworkLayer] {
        &self.layers
    }

    /// Layer ids from input to output.
    pub fn layer_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.layers.iter().map(|l| l.id.as_str())
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Iterates over every neuron, layer by layer.
    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> + '_ {
        self.layers.iter().flat_map(|l| l.neurons.iter())
    }

    #[must_use]
    pub fn neuron_count(&self) -> usize {
        self.layers.iter().map(|l| l.neurons.len()).sum()
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn neuron(&self, id: &str) -> Option<&Neuron> {
        self.neurons().find(|n| n.id == id)
    }

    #[must_use]
    pub fn connection(&self, from_neuron_id: &str, to_neuron_id: &str) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.from_neuron_id == from_neuron_id && c.to_neuron_id == to_neuron_id)
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.neurons.len())
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.neurons.len())
    }

    /// Output layer activations from the last forward pass, in neuron-index order.
    #[must_use]
    pub fn output(&self) -> Vec<f64> {
        self.layers
            .last()
            .map(|l| l.neurons.iter().map(|n| n.activation).collect())
            .unwrap_or_default()
    }

    /// Overwrites weights and biases with those of `source` where ids match.
    ///
    /// A connection is matched by its `(from_neuron_id, to_neuron_id)` pair and
    /// a bias by its neuron id. Unmatched parameters keep their current values.
    pub fn copy_matching_parameters(&mut self, source: &Network) -> ParameterTransfer {
        let weights: HashMap<(&str, &str), f64> = source
            .connections
            .iter()
            .map(|c| ((c.from_neuron_id.as_str(), c.to_neuron_id.as_str()), c.weight))
            .collect();
        let biases: HashMap<&str, f64> = source.neurons().map(|n| (n.id.as_str(), n.bias)).collect();

        let mut transfer = ParameterTransfer::default();
        for c in &mut self.connections {
            if let Some(&weight) = weights.get(&(c.from_neuron_id.as_str(), c.to_neuron_id.as_str())) {
                c.weight = weight;
                transfer.weights += 1;
            }
        }
        for layer in &mut self.layers {
            for n in &mut layer.neurons {
                if let Some(&bias) = biases.get(n.id.as_str()) {
                    n.bias = bias;
                    transfer.biases += 1;
                }
            }
        }
        transfer
    }

    /// Checks that connections fully connect adjacent layers in build order.
    fn check_connections(&self) -> Result<(), InvalidNetworkError> {
        let expected = self
            .layers
            .windows(2)
            .map(|pair| pair[0].neurons.len() * pair[1].neurons.len())
            .sum();
        if self.connections.len() != expected {
            return Err(InvalidNetworkError::ConnectionCount {
                expected,
                actual: self.connections.len(),
            });
        }

        let slots = self.layers.windows(2).enumerate().flat_map(|(l, pair)| {
            let (prev, next) = (&pair[0], &pair[1]);
            next.neurons.iter().enumerate().flat_map(move |(to_index, to_neuron)| {
                prev.neurons.iter().enumerate().map(move |(from_index, from_neuron)| {
                    let from = NeuronRef {
                        layer: l,
                        index: from_index,
                    };
                    let to = NeuronRef {
                        layer: l + 1,
                        index: to_index,
                    };
                    (from, from_neuron, to, to_neuron)
                })
            })
        });
        for (position, (c, slot)) in self.connections.iter().zip(slots).enumerate() {
            let (from, from_neuron, to, to_neuron) = slot;
            let in_place = c.from == from
                && c.to == to
                && c.from_neuron_id == from_neuron.id
                && c.to_neuron_id == to_neuron.id;
            if !in_place {
                return Err(InvalidNetworkError::MisplacedConnection {
                    position,
                    connection_id: c.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [NetworkLayer] {
        &mut self.layers
    }

    pub(crate) fn split_mut(&mut self) -> (&[NetworkLayer], &mut [Connection]) {
        (&self.layers, &mut self.connections)
    }

    /// Range of [`Self::connections`] that ends in layer `layer`.
    ///
    /// Empty for the input layer.
    pub(crate) fn incoming_range(&self, layer: usize) -> Range<usize> {
        let start = (1..layer)
            .map(|l| self.layers[l - 1].neurons.len() * self.layers[l].neurons.len())
            .sum::<usize>();
        let len = if layer == 0 {
            0
        } else {
            self.layers[layer - 1].neurons.len() * self.layers[layer].neurons.len()
        };
        start..start + len
    }
}

#[cfg(test)]
mod tests {
    use crate::{ActivationKind, LayerSpec, Seed};

    use super::*;

    fn architecture(sizes: &[usize]) -> Architecture {
        let last = sizes.len() - 1;
        let layers = sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| match i {
                0 => LayerSpec::input("in", n),
                i if i == last => LayerSpec::output("out", n, ActivationKind::Sigmoid),
                i => LayerSpec::hidden(format!("h{i}"), n, ActivationKind::ReLU),
            })
            .collect();
        Architecture::new(layers, 0.1)
    }

    #[test]
    fn test_counts_match_architecture() {
        for sizes in [&[2, 4, 1][..], &[3, 5, 4, 2], &[1, 1, 1], &[6, 2, 7, 3, 4]] {
            let arch = architecture(sizes);
            let network = Network::build(&arch, &mut Seed::from_u64(3).rng()).unwrap();
            let neurons: usize = sizes.iter().sum();
            let connections: usize = sizes.windows(2).map(|w| w[0] * w[1]).sum();
            assert_eq!(network.neuron_count(), neurons, "{sizes:?}");
            assert_eq!(network.connection_count(), connections, "{sizes:?}");
        }
    }

    #[test]
    fn test_ids_follow_layer_convention() {
        let network = Network::build(&architecture(&[2, 3, 1]), &mut Seed::from_u64(0).rng()).unwrap();
        let ids: Vec<&str> = network.neurons().map(Neuron::id).collect();
        assert_eq!(ids, ["in_0", "in_1", "h1_0", "h1_1", "h1_2", "out_0"]);
        let c = network.connection("in_1", "h1_2").unwrap();
        assert_eq!(c.id(), "in_1_h1_2");
        assert_eq!(c.source(), NeuronRef { layer: 0, index: 1 });
        assert_eq!(c.target(), NeuronRef { layer: 1, index: 2 });
        assert_eq!(network.layer_order().collect::<Vec<_>>(), ["in", "h1", "out"]);
    }

    #[test]
    fn test_initial_values_within_bounds() {
        let arch = architecture(&[4, 6, 3]);
        let network = Network::build(&arch, &mut Seed::from_u64(11).rng()).unwrap();
        for n in network.neurons() {
            assert!(n.bias().abs() < BIAS_INIT_RANGE);
            assert_eq!(n.activation(), 0.0);
            assert_eq!(n.delta(), 0.0);
        }
        for c in network.connections() {
            let limit = if c.target().layer == 1 {
                xavier_limit(4, 6)
            } else {
                xavier_limit(6, 3)
            };
            assert!(c.weight().abs() < limit);
        }
    }

    #[test]
    fn test_same_seed_builds_identical_networks() {
        let arch = architecture(&[3, 5, 4, 2]);
        let a = Network::build(&arch, &mut Seed::from_u64(99).rng()).unwrap();
        let b = Network::build(&arch, &mut Seed::from_u64(99).rng()).unwrap();
        for (ca, cb) in a.connections().iter().zip(b.connections()) {
            assert_eq!(ca.weight().to_bits(), cb.weight().to_bits());
        }
        for (na, nb) in a.neurons().zip(b.neurons()) {
            assert_eq!(na.bias().to_bits(), nb.bias().to_bits());
        }

        let c = Network::build(&arch, &mut Seed::from_u64(100).rng()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_invalid_architecture_is_rejected() {
        let arch = Architecture::new(vec![LayerSpec::input("in", 2)], 0.1);
        let err = Network::build(&arch, &mut Seed::from_u64(0).rng()).unwrap_err();
        assert_eq!(err, InvalidArchitectureError::TooFewLayers { count: 1 });
    }

    #[test]
    fn test_incoming_ranges_partition_connections() {
        let network = Network::build(&architecture(&[3, 5, 4, 2]), &mut Seed::from_u64(5).rng()).unwrap();
        assert_eq!(network.incoming_range(0), 0..0);
        assert_eq!(network.incoming_range(1), 0..15);
        assert_eq!(network.incoming_range(2), 15..35);
        assert_eq!(network.incoming_range(3), 35..43);
        for layer in 1..4 {
            for c in &network.connections()[network.incoming_range(layer)] {
                assert_eq!(c.target().layer, layer);
                assert_eq!(c.source().layer, layer - 1);
            }
        }
    }

    #[test]
    fn test_clone_is_independent() {
        let arch = architecture(&[2, 3, 1]);
        let mut original = Network::build(&arch, &mut Seed::from_u64(8).rng()).unwrap();
        let snapshot = original.clone();
        original.forward(&[0.2, 0.9], &arch);
        original.backward(&[1.0], 0.5, &arch);
        assert_ne!(original, snapshot);
        assert!(snapshot.neurons().all(|n| n.activation() == 0.0));
    }

    #[test]
    fn test_copy_matching_parameters_partial() {
        let source = Network::build(&architecture(&[2, 3, 1]), &mut Seed::from_u64(1).rng()).unwrap();
        let mut target = Network::build(&architecture(&[2, 4, 1]), &mut Seed::from_u64(2).rng()).unwrap();
        let fresh = target.clone();

        let transfer = target.copy_matching_parameters(&source);
        // in→h1: 2×3 shared pairs, h1→out: 3 shared pairs
        assert_eq!(transfer.weights, 6 + 3);
        assert_eq!(transfer.biases, 2 + 3 + 1);

        let copied = target.connection("in_1", "h1_2").unwrap();
        assert_eq!(copied.weight(), source.connection("in_1", "h1_2").unwrap().weight());
        let kept = target.connection("in_0", "h1_3").unwrap();
        assert_eq!(kept.weight(), fresh.connection("in_0", "h1_3").unwrap().weight());
        assert_eq!(
            target.neuron("h1_3").unwrap().bias(),
            fresh.neuron("h1_3").unwrap().bias()
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let network = Network::build(&architecture(&[2, 3, 1]), &mut Seed::from_u64(4).rng()).unwrap();
        let json = serde_json::to_string(&network).unwrap();
        let restored: Network = serde_json::from_str(&json).unwrap();
        assert_eq!(network, restored);
    }

    fn network_json(sizes: &[usize]) -> serde_json::Value {
        let network = Network::build(&architecture(sizes), &mut Seed::from_u64(5).rng()).unwrap();
        serde_json::to_value(&network).unwrap()
    }

    #[test]
    fn test_deserialize_rejects_missing_connection() {
        let mut json = network_json(&[2, 3, 1]);
        json["connections"].as_array_mut().unwrap().pop();
        let err = serde_json::from_value::<Network>(json).unwrap_err();
        assert!(
            err.to_string().contains("network has 8 connections, its layers need 9"),
            "{err}"
        );
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_connection() {
        let mut json = network_json(&[2, 3, 1]);
        json["connections"][0]["from"]["index"] = serde_json::json!(7);
        let err = serde_json::from_value::<Network>(json).unwrap_err();
        assert!(err.to_string().contains("connection #0"), "{err}");
    }

    #[test]
    fn test_deserialize_rejects_reordered_connections() {
        let mut json = network_json(&[2, 3, 1]);
        json["connections"].as_array_mut().unwrap().swap(0, 8);
        assert!(serde_json::from_value::<Network>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_dropped_neuron() {
        let mut json = network_json(&[2, 3, 1]);
        json["layers"][1]["neurons"].as_array_mut().unwrap().pop();
        assert!(serde_json::from_value::<Network>(json).is_err());
    }
}
