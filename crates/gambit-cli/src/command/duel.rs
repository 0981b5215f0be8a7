use std::path::{Path, PathBuf};

use anyhow::Context;
use gambit_brain::Brain;
use gambit_engine::{Color, MoveKind};
use gambit_evaluator::{MatchConfig, MatchPlay, MovePolicy, MoveSelection};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DuelArg {
    /// Brain file playing White
    white: PathBuf,
    /// Brain file playing Black
    black: PathBuf,
    /// Always play the best-scored move instead of sampling
    #[arg(long)]
    greedy: bool,
    /// Softmax temperature of sampled moves
    #[arg(long, default_value_t = 1.0)]
    temperature: f32,
    /// Seed of move sampling; derived from the clock when omitted
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 300)]
    max_plies: usize,
    /// Divide both scores by the number of plies played
    #[arg(long)]
    normalize: bool,
}

fn load_policy(side: Color, path: &Path) -> anyhow::Result<MovePolicy> {
    let brain = Brain::load(path)
        .with_context(|| format!("Failed to load {} brain", side.as_str()))?;
    MovePolicy::new(brain).with_context(|| {
        format!(
            "{} brain cannot play chess: {}",
            side.as_str(),
            path.display()
        )
    })
}

pub(crate) fn run(arg: &DuelArg) -> anyhow::Result<()> {
    let mut white = load_policy(Color::White, &arg.white)?;
    let mut black = load_policy(Color::Black, &arg.black)?;
    let selection = if arg.greedy {
        MoveSelection::Greedy
    } else {
        MoveSelection::Sample {
            temperature: arg.temperature,
        }
    };
    let seed = arg.seed.unwrap_or_else(util::clock_seed);
    let mut rng = Pcg32::seed_from_u64(seed);
    let config = MatchConfig {
        max_plies: arg.max_plies,
        normalize: arg.normalize,
        ..MatchConfig::default()
    };

    println!("White: {}", arg.white.display());
    println!("Black: {}", arg.black.display());
    println!("Seed:  {seed}");
    println!();

    let outcome = MatchPlay::new(&config, selection)
        .run(&mut white, &mut black, &mut rng, |record, state| {
            let applied = &record.applied;
            let mut line = format!(
                "{:4}. {:5} {} {}",
                record.ply,
                applied.color.as_str(),
                applied.mv,
                applied.piece.as_str()
            );
            if applied.kind == MoveKind::Castle {
                line.push_str(", castles");
            }
            if let Some(captured) = applied.captured {
                line.push_str(&format!(", takes {}", captured.as_str()));
            }
            if let Some(promotion) = applied.promotion {
                line.push_str(&format!(", promotes to {}", promotion.as_str()));
            }
            let replies = state.safe_moves(applied.color.opponent()).len();
            println!("{line} ({:+.3}, {replies} replies)", record.score);
        })
        .context("Duel failed")?;

    println!();
    println!("{}", outcome.state().board());
    println!(
        "Result: {} after {} plies",
        outcome.termination(),
        outcome.plies()
    );
    println!(
        "Score:  white {:.3}, black {:.3}",
        outcome.score(Color::White),
        outcome.score(Color::Black)
    );
    Ok(())
}
