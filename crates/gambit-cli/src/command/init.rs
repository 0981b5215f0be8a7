use std::path::PathBuf;

use anyhow::Context;
use gambit_evaluator::{DEFAULT_HIDDEN_LAYERS, new_chess_brain};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InitArg {
    /// Brain file to write
    output: PathBuf,
    /// Hidden layer widths, e.g. `1024,512`
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_HIDDEN_LAYERS)]
    hidden: Vec<usize>,
    /// Seed of the weight initialisation; derived from the clock when omitted
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &InitArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(util::clock_seed);
    let brain = new_chess_brain(&arg.hidden, &mut Pcg32::seed_from_u64(seed))
        .context("Failed to create brain")?;
    brain.save(&arg.output).context("Failed to write brain")?;

    eprintln!("Brain written successfully");
    eprintln!("  Path: {}", arg.output.display());
    eprintln!("  Seed: {seed}");
    eprintln!("  Parameters: {}", brain.parameter_count());
    Ok(())
}
