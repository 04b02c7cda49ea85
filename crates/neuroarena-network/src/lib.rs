//! Dense feed-forward network model and its propagation engine.
//!
//! This crate contains the numerical core of the arena: the plain data that
//! describes a network, the initializer that turns an [`Architecture`] into a
//! [`Network`], and the forward and backward passes that mutate it.
//!
//! # Components
//!
//! - [`activation`] - Activation functions and their derivatives
//! - [`architecture`] - Layer specifications and architecture validation
//! - [`network`] - Neurons, connections, and the Xavier-initialized [`Network`]
//! - [`propagation`] - Forward pass, read-only prediction, and backward pass
//! - [`seed`] - 128-bit seed for reproducible random number generation
//!
//! # Data Flow
//!
//! ```text
//! Architecture
//!     ↓ Network::build
//! Network
//!     ↓ forward(input)      → output activations
//!     ↓ backward(target)    → summed absolute error, weights updated in place
//! ```
//!
//! # Example
//!
//! ```
//! use neuroarena_network::{ActivationKind, Architecture, LayerSpec, Network, Seed};
//!
//! let architecture = Architecture::new(
//!     vec![
//!         LayerSpec::input("input", 2),
//!         LayerSpec::hidden("hidden", 4, ActivationKind::ReLU),
//!         LayerSpec::output("output", 1, ActivationKind::Sigmoid),
//!     ],
//!     0.01,
//! );
//!
//! let mut rng = Seed::from_u64(42).rng();
//! let mut network = Network::build(&architecture, &mut rng).unwrap();
//! assert_eq!(network.neuron_count(), 7);
//! assert_eq!(network.connection_count(), 2 * 4 + 4 * 1);
//!
//! let output = network.forward(&[0.3, 0.7], &architecture);
//! assert_eq!(output.len(), 1);
//!
//! let error = network.backward(&[1.0], architecture.learning_rate(), &architecture);
//! assert!(error >= 0.0);
//! ```
//!
//! # Ownership
//!
//! A [`Network`] is mutated in place by [`Network::forward`] and
//! [`Network::backward`], so a single instance must not be trained from two
//! places at once. Cloning produces a fully independent deep copy, which is
//! how opponents and snapshots are made. Read-only evaluation goes through
//! [`Network::predict`], which never writes neuron state.

pub use self::{activation::*, architecture::*, network::*, seed::*};

pub mod activation;
pub mod architecture;
pub mod network;
pub mod propagation;
pub mod seed;

/// Reasons an [`Architecture`] cannot be built into a [`Network`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidArchitectureError {
    #[display("architecture needs at least 3 layers, got {count}")]
    TooFewLayers { count: usize },
    #[display("architecture has no input layer")]
    MissingInput,
    #[display("architecture has {count} input layers, expected exactly one")]
    DuplicateInput { count: usize },
    #[display("architecture has no output layer")]
    MissingOutput,
    #[display("architecture has {count} output layers, expected exactly one")]
    DuplicateOutput { count: usize },
    #[display("input layer `{layer_id}` must be the first layer")]
    MisplacedInput { layer_id: String },
    #[display("output layer `{layer_id}` must be the last layer")]
    MisplacedOutput { layer_id: String },
    #[display("layer `{layer_id}` has no neurons")]
    EmptyLayer { layer_id: String },
    #[display("layer id `{layer_id}` is used by more than one layer")]
    DuplicateLayerId { layer_id: String },
}

/// Reasons deserialized network data does not describe a fully connected network.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidNetworkError {
    #[display("network has {actual} connections, its layers need {expected}")]
    ConnectionCount { expected: usize, actual: usize },
    #[display("connection #{position} (`{connection_id}`) is out of place")]
    MisplacedConnection {
        position: usize,
        connection_id: String,
    },
}
