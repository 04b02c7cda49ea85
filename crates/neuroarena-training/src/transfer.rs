//! Partial weight transfer between architectures.

use neuroarena_network::{Architecture, InvalidArchitectureError, Network, ParameterTransfer};
use rand::Rng;

/// Builds a fresh network for `target_architecture` and seeds it with `source`'s parameters.
///
/// Every connection whose `(from, to)` neuron id pair exists in both networks
/// takes the source weight, and every neuron whose id exists in both takes
/// the source bias. Everything else keeps its fresh random value. Mismatched
/// architectures are not an error; a transfer may copy nothing at all.
///
/// Returns the new network with the counts of copied weights and biases.
///
/// # Errors
///
/// Returns [`InvalidArchitectureError`] if `target_architecture` is invalid.
///
/// # Example
///
/// ```
/// use neuroarena_network::{Network, Seed};
/// use neuroarena_training::{default_architecture, transfer_weights};
///
/// let architecture = default_architecture();
/// let mut rng = Seed::from_u64(7).rng();
/// let source = Network::build(&architecture, &mut rng).unwrap();
///
/// let (copy, copied) = transfer_weights(&source, &architecture, &mut rng).unwrap();
/// assert_eq!(copy, source);
/// assert_eq!(copied.weights, source.connection_count());
/// ```
pub fn transfer_weights<R>(
    source: &Network,
    target_architecture: &Architecture,
    rng: &mut R,
) -> Result<(Network, ParameterTransfer), InvalidArchitectureError>
where
    R: Rng + ?Sized,
{
    let mut network = Network::build(target_architecture, rng)?;
    let copied = network.copy_matching_parameters(source);
    log::debug!(
        "transferred {}/{} weights and {}/{} biases",
        copied.weights,
        network.connection_count(),
        copied.biases,
        network.neuron_count(),
    );
    Ok((network, copied))
}

#[cfg(test)]
mod tests {
    use neuroarena_network::{ActivationKind, LayerSpec, Seed};

    use super::*;

    fn architecture(hidden: usize, output: usize) -> Architecture {
        Architecture::new(
            vec![
                LayerSpec::input("input", 3),
                LayerSpec::hidden("hidden", hidden, ActivationKind::ReLU),
                LayerSpec::output("output", output, ActivationKind::Sigmoid),
            ],
            0.05,
        )
    }

    #[test]
    fn test_same_architecture_copies_everything() {
        let arch = architecture(4, 2);
        let mut rng = Seed::from_u64(1).rng();
        let source = Network::build(&arch, &mut rng).unwrap();
        let (copy, copied) = transfer_weights(&source, &arch, &mut rng).unwrap();
        assert_eq!(
            copied,
            ParameterTransfer {
                weights: 3 * 4 + 4 * 2,
                biases: 3 + 4 + 2,
            }
        );

        for (a, b) in source.connections().iter().zip(copy.connections()) {
            assert_eq!(a.weight(), b.weight());
        }
        for (a, b) in source.neurons().zip(copy.neurons()) {
            assert_eq!(a.bias(), b.bias());
        }
    }

    #[test]
    fn test_wider_target_keeps_fresh_values_for_new_parameters() {
        let mut rng = Seed::from_u64(2).rng();
        let source = Network::build(&architecture(4, 2), &mut rng).unwrap();
        let target_arch = architecture(6, 2);

        // replay the fresh build the transfer will make
        let mut replay = rng.clone();
        let fresh = Network::build(&target_arch, &mut replay).unwrap();
        let (copy, copied) = transfer_weights(&source, &target_arch, &mut rng).unwrap();

        assert_eq!(copy.connection_count(), 3 * 6 + 6 * 2);
        // the two extra hidden neurons bring 3 + 2 fresh weights each
        assert_eq!(copied.weights, 3 * 4 + 4 * 2);
        assert_eq!(copied.biases, 3 + 4 + 2);
        for c in copy.connections() {
            let expected = source
                .connection(c.from_neuron_id(), c.to_neuron_id())
                .or_else(|| fresh.connection(c.from_neuron_id(), c.to_neuron_id()))
                .unwrap();
            assert_eq!(c.weight(), expected.weight(), "{}", c.id());
        }
        assert_eq!(
            copy.neuron("hidden_5").unwrap().bias(),
            fresh.neuron("hidden_5").unwrap().bias()
        );
        assert_eq!(
            copy.neuron("hidden_0").unwrap().bias(),
            source.neuron("hidden_0").unwrap().bias()
        );
    }

    #[test]
    fn test_disjoint_ids_copy_nothing() {
        let mut rng = Seed::from_u64(3).rng();
        let source = Network::build(&architecture(4, 2), &mut rng).unwrap();
        let target_arch = Architecture::new(
            vec![
                LayerSpec::input("in", 3),
                LayerSpec::hidden("h", 4, ActivationKind::Tanh),
                LayerSpec::output("out", 2, ActivationKind::Linear),
            ],
            0.05,
        );

        let mut replay = rng.clone();
        let fresh = Network::build(&target_arch, &mut replay).unwrap();
        let (copy, copied) = transfer_weights(&source, &target_arch, &mut rng).unwrap();
        assert_eq!(copy, fresh);
        assert_eq!(copied, ParameterTransfer::default());
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let mut rng = Seed::from_u64(4).rng();
        let source = Network::build(&architecture(4, 2), &mut rng).unwrap();
        let err = transfer_weights(&source, &architecture(0, 2), &mut rng).unwrap_err();
        assert!(matches!(err, InvalidArchitectureError::EmptyLayer { .. }));
    }
}
