use std::path::PathBuf;

use chrono::Utc;
use neuroarena_network::{ActivationKind, Architecture, Seed};
use neuroarena_training::{TrainingSession, transfer_weights};

use crate::{
    config::layered_architecture,
    schema::model::TrainedModel,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TransferArg {
    /// Source model file
    model: PathBuf,
    /// Target architecture JSON file
    #[arg(long, conflicts_with = "hidden")]
    architecture: Option<PathBuf>,
    /// Hidden layer sizes of the target, e.g. `8,4`
    #[arg(long, value_delimiter = ',')]
    hidden: Vec<usize>,
    /// Activation of the target's hidden layers (defaults to the source's first hidden layer)
    #[arg(long)]
    activation: Option<ActivationKind>,
    /// Episodes to train after the transfer
    #[arg(long, default_value_t = 0)]
    episodes: usize,
    /// Seed as 32 hex digits or an integer (random if omitted)
    #[arg(long, value_parser = util::parse_seed)]
    seed: Option<Seed>,
    /// Model name (defaults to `<source name>-transfer`)
    #[arg(long)]
    name: Option<String>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TransferArg) -> anyhow::Result<()> {
    let TransferArg {
        model,
        architecture,
        hidden,
        activation,
        episodes,
        seed,
        name,
        output,
    } = arg;

    let source = util::read_model_file(model)?;
    let target = match architecture {
        Some(path) => util::read_json_file::<Architecture, _>("architecture", path)?,
        None => target_architecture(&source, hidden, *activation)?,
    }
    .with_io_sizes(source.scenario.input_size, source.scenario.output_size);

    let seed = util::seed_or_random(*seed);
    let mut rng = seed.rng();
    let (network, copied) = transfer_weights(&source.network, &target, &mut rng)?;
    eprintln!(
        "Transferred {}/{} weights and {}/{} biases from `{}`",
        copied.weights,
        network.connection_count(),
        copied.biases,
        network.neuron_count(),
        source.name
    );

    let mut session = TrainingSession::with_network(source.scenario.clone(), &target, network, seed)?;
    session.run(*episodes)?;
    let validation_accuracy = match session.last_evaluation() {
        Some(evaluation) => evaluation.accuracy,
        None => neuroarena_training::evaluate(session.state(), session.architecture())?.accuracy,
    };

    let state = session.state();
    let model = TrainedModel {
        name: name
            .clone()
            .unwrap_or_else(|| format!("{}-transfer", source.name)),
        trained_at: Utc::now(),
        scenario: source.scenario.clone(),
        architecture: session.architecture().clone(),
        seed,
        final_accuracy: state
            .latest_episode()
            .map_or(source.final_accuracy, |e| e.accuracy),
        validation_accuracy,
        episodes: source.episodes + state.episodes().len(),
        network: state.network().clone(),
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Layers: {}", util::layer_summary(&model.architecture));
    eprintln!("  Validation accuracy: {:.3}", model.validation_accuracy);

    Ok(())
}

fn target_architecture(
    source: &TrainedModel,
    hidden: &[usize],
    activation: Option<ActivationKind>,
) -> anyhow::Result<Architecture> {
    anyhow::ensure!(
        !hidden.is_empty(),
        "either --architecture or --hidden is required"
    );
    let layers = source.architecture.layers();
    let hidden_activation = activation
        .or_else(|| layers.get(1).map(|l| l.activation))
        .unwrap_or(ActivationKind::ReLU);
    let output_activation = layers
        .last()
        .map_or(ActivationKind::Sigmoid, |l| l.activation);
    Ok(layered_architecture(
        source.scenario.input_size,
        hidden,
        hidden_activation,
        source.scenario.output_size,
        output_activation,
        source.architecture.learning_rate(),
    ))
}
