use clap::{Parser, Subcommand};

use self::{battle::BattleArg, inspect::InspectArg, train::TrainArg, transfer::TransferArg};

mod battle;
mod inspect;
mod train;
mod transfer;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train a network on a scenario and save the model
    Train(#[clap(flatten)] TrainArg),
    /// Pit two trained models against each other
    Battle(#[clap(flatten)] BattleArg),
    /// Copy a model's weights into a new architecture
    Transfer(#[clap(flatten)] TransferArg),
    /// Summarize a saved model
    Inspect(#[clap(flatten)] InspectArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Battle(arg) => battle::run(&arg)?,
        Mode::Transfer(arg) => transfer::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
    }
    Ok(())
}
