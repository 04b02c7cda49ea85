//! Forward and backward passes.
//!
//! # Forward
//!
//! Input neurons take their activation directly from the input vector (no
//! bias, no activation function). Every later neuron computes
//!
//! ```text
//! sum        = bias + Σ(from.activation × weight)   over incoming connections
//! activation = f(sum)                               f = the layer's activation
//! ```
//!
//! # Backward
//!
//! The error signal is `target - output`, and parameters move *along* it:
//!
//! ```text
//! output neuron:  error = target[i] - activation        delta = error × f'(sum)
//! hidden neuron:  error = Σ(to.delta × weight)           delta = error × f'(sum)
//!                 (outgoing connections, walked from the last hidden layer back)
//! connection:     gradient = from.activation × to.delta  weight += lr × gradient
//! neuron:         bias += lr × delta                     (non-input neurons)
//! ```
//!
//! All deltas are computed before any weight moves, so hidden deltas see the
//! weights of the forward pass. The returned step error is the *sum of absolute*
//! output errors, not a squared loss.
//!
//! Non-finite values are not intercepted: a learning rate large enough to
//! diverge yields NaN or infinite weights, and they propagate as they are.

use crate::{Architecture, Network};

/// Per-layer pre-activation sums and activations of one pass.
#[derive(Debug, Clone)]
struct LayerValues {
    sums: Vec<f64>,
    activations: Vec<f64>,
}

impl Network {
    /// Runs a forward pass and stores the result in every neuron.
    ///
    /// Returns the output layer activations in neuron-index order.
    ///
    /// # Panics
    ///
    /// Panics if `input` does not match the input layer size, or if
    /// `architecture` does not have the same number of layers as the network.
    pub fn forward(&mut self, input: &[f64], architecture: &Architecture) -> Vec<f64> {
        let values = self.compute_layers(input, architecture);
        for (layer, values) in self.layers_mut().iter_mut().zip(&values) {
            for ((neuron, &sum), &activation) in layer
                .neurons_mut()
                .iter_mut()
                .zip(&values.sums)
                .zip(&values.activations)
            {
                neuron.set_forward_state(sum, activation);
            }
        }
        values
            .into_iter()
            .next_back()
            .map(|v| v.activations)
            .unwrap_or_default()
    }

    /// Computes the output for `input` without touching neuron state.
    ///
    /// Uses exactly the same arithmetic as [`Self::forward`], so both return
    /// bit-identical outputs for the same network and input.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Self::forward`].
    #[must_use]
    pub fn predict(&self, input: &[f64], architecture: &Architecture) -> Vec<f64> {
        self.compute_layers(input, architecture)
            .into_iter()
            .next_back()
            .map(|v| v.activations)
            .unwrap_or_default()
    }

    /// Backpropagates `target` through the state left by the last [`Self::forward`]
    /// and updates weights and biases in place.
    ///
    /// Returns the summed absolute error of the output layer.
    ///
    /// # Panics
    ///
    /// Panics if `target` does not match the output layer size, or if
    /// `architecture` does not have the same number of layers as the network.
    pub fn backward(&mut self, target: &[f64], learning_rate: f64, architecture: &Architecture) -> f64 {
        let layer_count = self.layers().len();
        assert_eq!(
            architecture.layers().len(),
            layer_count,
            "architecture does not describe this network"
        );
        assert_eq!(
            target.len(),
            self.output_size(),
            "target length does not match output layer size"
        );

        // output layer
        let output_layer = layer_count - 1;
        let output_activation = architecture.layers()[output_layer].activation;
        let mut total_error = 0.0;
        for (neuron, &t) in self.layers_mut()[output_layer]
            .neurons_mut()
            .iter_mut()
            .zip(target)
        {
            let error = t - neuron.activation();
            neuron.set_delta(error * output_activation.derivative(neuron.pre_activation_sum()));
            total_error += error.abs();
        }

        // hidden layers, last to first
        for layer in (1..output_layer).rev() {
            let mut errors = vec![0.0; self.layers()[layer].neurons().len()];
            let next = &self.layers()[layer + 1];
            for c in &self.connections()[self.incoming_range(layer + 1)] {
                errors[c.source().index] += next.neurons()[c.target().index].delta() * c.weight();
            }
            let activation = architecture.layers()[layer].activation;
            for (neuron, error) in self.layers_mut()[layer].neurons_mut().iter_mut().zip(errors) {
                neuron.set_delta(error * activation.derivative(neuron.pre_activation_sum()));
            }
        }

        // weights
        let (layers, connections) = self.split_mut();
        for c in connections {
            let from = &layers[c.source().layer].neurons()[c.source().index];
            let to = &layers[c.target().layer].neurons()[c.target().index];
            c.apply_gradient(from.activation() * to.delta(), learning_rate);
        }

        // biases
        for layer in self.layers_mut().iter_mut().skip(1) {
            for neuron in layer.neurons_mut() {
                neuron.add_to_bias(learning_rate * neuron.delta());
            }
        }

        total_error
    }

    fn compute_layers(&self, input: &[f64], architecture: &Architecture) -> Vec<LayerValues> {
        assert_eq!(
            architecture.layers().len(),
            self.layers().len(),
            "architecture does not describe this network"
        );
        assert_eq!(
            input.len(),
            self.input_size(),
            "input length does not match input layer size"
        );

        let mut values: Vec<LayerValues> = Vec::with_capacity(self.layers().len());
        values.push(LayerValues {
            sums: input.to_vec(),
            activations: input.to_vec(),
        });
        for (layer_index, spec) in architecture.layers().iter().enumerate().skip(1) {
            let prev = &values[layer_index - 1].activations;
            let mut sums: Vec<f64> = self.layers()[layer_index]
                .neurons()
                .iter()
                .map(|n| n.bias())
                .collect();
            for c in &self.connections()[self.incoming_range(layer_index)] {
                sums[c.target().index] += prev[c.source().index] * c.weight();
            }
            let activations = sums.iter().map(|&s| spec.activation.apply(s)).collect();
            values.push(LayerValues { sums, activations });
        }
        values
    }
}
