use std::path::PathBuf;

use neuroarena_network::LayerKind;
use neuroarena_stats::descriptive::DescriptiveStats;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Model file
    model: PathBuf,
    /// Also print per-layer parameter statistics
    #[arg(long)]
    layers: bool,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let InspectArg { model, layers } = arg;
    let model = util::read_model_file(model)?;
    let network = &model.network;

    println!("Model: {}", model.name);
    println!("  Trained at: {}", model.trained_at);
    println!(
        "  Scenario: {} ({}, {} → {}, variance {})",
        model.scenario.name,
        model.scenario.kind,
        model.scenario.input_size,
        model.scenario.output_size,
        model.scenario.variance
    );
    println!("  Seed: {}", model.seed);
    println!("  Layers: {}", util::layer_summary(&model.architecture));
    println!("  Learning rate: {}", model.architecture.learning_rate());
    println!(
        "  Neurons: {}, connections: {}",
        network.neuron_count(),
        network.connection_count()
    );
    println!("  Episodes: {}", model.episodes);
    println!("  Final accuracy: {:.3}", model.final_accuracy);
    println!("  Validation accuracy: {:.3}", model.validation_accuracy);

    print_stats("Weights", network.connections().iter().map(|c| c.weight()));
    print_stats(
        "Biases",
        network
            .layers()
            .iter()
            .filter(|l| l.kind() != LayerKind::Input)
            .flat_map(|l| l.neurons())
            .map(|n| n.bias()),
    );

    if *layers {
        for (index, layer) in network.layers().iter().enumerate().skip(1) {
            println!("Layer `{}` ({:?}):", layer.id(), layer.kind());
            print_stats(
                "Incoming weights",
                network
                    .connections()
                    .iter()
                    .filter(|c| c.target().layer == index)
                    .map(|c| c.weight()),
            );
            print_stats("Biases", layer.neurons().iter().map(|n| n.bias()));
        }
    }

    Ok(())
}

fn print_stats(label: &str, values: impl IntoIterator<Item = f64>) {
    match DescriptiveStats::new(values) {
        Some(s) => println!(
            "  {label}: n {} min {:.4} max {:.4} mean {:.4} median {:.4} std {:.4}",
            s.count, s.min, s.max, s.mean, s.median, s.std_dev
        ),
        None => println!("  {label}: none"),
    }
}
