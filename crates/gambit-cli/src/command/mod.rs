use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{duel::DuelArg, init::InitArg, inspect::InspectArg, train::TrainArg};

mod duel;
mod init;
mod inspect;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a population of chess brains through self-play
    Train(#[clap(flatten)] TrainArg),
    /// Play one game between two saved brains
    Duel(#[clap(flatten)] DuelArg),
    /// Show the layers of a saved brain
    Inspect(#[clap(flatten)] InspectArg),
    /// Write a freshly initialised chess brain
    Init(#[clap(flatten)] InitArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Duel(arg) => duel::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
        Mode::Init(arg) => init::run(&arg)?,
    }
    Ok(())
}
