use std::path::PathBuf;

use anyhow::ensure;
use neuroarena_network::Seed;
use neuroarena_training::{battle::DEFAULT_BATTLE_ROUNDS, scenario::Scenario};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BattleArg {
    /// Model file of network 1
    model1: PathBuf,
    /// Model file of network 2
    model2: PathBuf,
    /// Number of rounds
    #[arg(long, default_value_t = DEFAULT_BATTLE_ROUNDS)]
    rounds: usize,
    /// Seed as 32 hex digits or an integer (random if omitted)
    #[arg(long, value_parser = util::parse_seed)]
    seed: Option<Seed>,
    /// Write the battle result as JSON to this file ("-" for stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &BattleArg) -> anyhow::Result<()> {
    let BattleArg {
        model1,
        model2,
        rounds,
        seed,
        output,
    } = arg;

    let model1 = util::read_model_file(model1)?;
    let model2 = util::read_model_file(model2)?;

    let layers1 = model1.architecture.layers();
    let layers2 = model2.architecture.layers();
    ensure!(
        layers1.len() == layers2.len()
            && layers1
                .iter()
                .zip(layers2)
                .all(|(a, b)| a.activation == b.activation),
        "models `{}` and `{}` have incompatible layer structures",
        model1.name,
        model2.name,
    );
    ensure!(
        same_shape(&model1.scenario, &model2.scenario),
        "models `{}` and `{}` were trained for different scenario shapes",
        model1.name,
        model2.name,
    );

    let seed = util::seed_or_random(*seed);
    let result = neuroarena_training::battle(
        &model1.network,
        &model2.network,
        &model1.architecture,
        &model1.scenario,
        *rounds,
        &mut seed.rng(),
    )?;

    eprintln!("Battle on `{}` ({rounds} rounds):", model1.scenario.name);
    eprintln!("  Network 1: {}", model1.name);
    eprintln!("  Network 2: {}", model2.name);
    eprintln!("  Scores: {} - {}", result.scores.0, result.scores.1);
    eprintln!("  Winner: {}", result.winner);
    eprintln!("  {}", result.details);

    if let Some(path) = output {
        let path = (path.as_os_str() != "-").then(|| path.clone());
        Output::save_json(&result, path)?;
    }
    Ok(())
}

fn same_shape(a: &Scenario, b: &Scenario) -> bool {
    a.kind == b.kind && a.input_size == b.input_size && a.output_size == b.output_size
}
