use std::path::PathBuf;

use chrono::Utc;
use neuroarena_network::Seed;
use neuroarena_stats::descriptive::DescriptiveStats;
use neuroarena_training::{
    TrainingSession,
    scenario::{Scenario, ScenarioKind},
};

use crate::{
    config::RunConfig,
    schema::model::TrainedModel,
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Run config JSON file (defaults to the preset of `--scenario`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scenario preset; replaces the config's scenario when both are given
    #[arg(long)]
    scenario: Option<ScenarioKind>,
    /// Number of episodes to train
    #[arg(long)]
    episodes: Option<usize>,
    /// Seed as 32 hex digits or an integer (random if omitted)
    #[arg(long, value_parser = util::parse_seed)]
    seed: Option<Seed>,
    /// Print a progress line every N episodes
    #[arg(long, default_value_t = 10)]
    report_every: usize,
    /// Model name (defaults to the scenario name)
    #[arg(long)]
    name: Option<String>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        config,
        scenario,
        episodes,
        seed,
        report_every,
        name,
        output,
    } = arg;

    let mut config = match config {
        Some(path) => util::read_config_file(path)?,
        None => RunConfig::preset(scenario.unwrap_or(ScenarioKind::Classification)),
    };
    if let Some(kind) = scenario {
        config.scenario = Scenario::preset(*kind);
    }
    if let Some(episodes) = episodes {
        config.episodes = *episodes;
    }
    let seed = util::seed_or_random(seed.or(config.seed));

    let mut session = TrainingSession::new(config.scenario.clone(), &config.architecture, seed)?;
    eprintln!(
        "Training `{}` ({}) for {} episodes with seed {seed}",
        config.scenario.name, config.scenario.kind, config.episodes
    );

    for _ in 0..config.episodes {
        let result = session.step()?;
        let n = result.episode_number;
        if n == config.episodes || (*report_every > 0 && n % report_every == 0) {
            let state = session.state();
            let (val_accuracy, val_loss) = session
                .last_evaluation()
                .map_or((f64::NAN, f64::NAN), |e| (e.accuracy, e.loss));
            eprintln!(
                "  Episode #{n:4}: acc {:.3} loss {:.4} | val acc {val_accuracy:.3} loss {val_loss:.4} | risk {:.1} conv {:.3}",
                result.accuracy,
                result.loss,
                state.overfitting_risk(),
                state.convergence_score(),
            );
        }
    }

    let state = session.state();
    let episodes = state.episodes();
    if let (Some(accuracy), Some(loss)) = (
        DescriptiveStats::new(episodes.iter().map(|e| e.accuracy)),
        DescriptiveStats::new(episodes.iter().map(|e| e.loss)),
    ) {
        eprintln!("Episode Stats:");
        eprintln!(
            "  Accuracy: min {:.3} max {:.3} mean {:.3} std {:.3}",
            accuracy.min, accuracy.max, accuracy.mean, accuracy.std_dev
        );
        eprintln!(
            "  Loss:     min {:.4} max {:.4} mean {:.4} std {:.4}",
            loss.min, loss.max, loss.mean, loss.std_dev
        );
    }

    let model = TrainedModel {
        name: name.clone().unwrap_or_else(|| config.scenario.name.clone()),
        trained_at: Utc::now(),
        scenario: config.scenario.clone(),
        architecture: session.architecture().clone(),
        seed,
        final_accuracy: state.latest_episode().map_or(0.0, |e| e.accuracy),
        validation_accuracy: session.last_evaluation().map_or(0.0, |e| e.accuracy),
        episodes: episodes.len(),
        network: state.network().clone(),
    };
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final accuracy: {:.3}", model.final_accuracy);
    eprintln!("  Validation accuracy: {:.3}", model.validation_accuracy);
    eprintln!("  Best accuracy: {:.3}", state.best_accuracy());

    Ok(())
}
