use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use gambit_training::{StopToken, Trainer, TrainerConfig};
use tracing::{info, warn};

use crate::{
    model::{checkpoint::DirectoryStore, manifest::RunManifest},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Directory receiving the run manifest and generation checkpoints
    #[arg(long, default_value = "checkpoints")]
    checkpoint_dir: PathBuf,
    /// Trainer configuration file (JSON); missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// First generation to run; a non-zero start resumes from the checkpoint of the
    /// generation before it
    #[arg(long, conflicts_with = "resume")]
    start: Option<u64>,
    /// Continue after the latest checkpointed generation
    #[arg(long)]
    resume: bool,
    /// Generation to stop before
    #[arg(long, default_value_t = 100)]
    stop: u64,
    #[arg(long)]
    population: Option<usize>,
    /// Number of elites kept and bred each generation
    #[arg(long)]
    elite: Option<usize>,
    /// Worker threads playing matches
    #[arg(long)]
    threads: Option<usize>,
    /// Seed of every random stream; derived from the clock when neither this nor a
    /// configuration provides one
    #[arg(long)]
    seed: Option<u64>,
    /// Softmax temperature of sampled moves
    #[arg(long)]
    temperature: Option<f32>,
    /// Play every n-th generation greedily
    #[arg(long)]
    greedy_interval: Option<usize>,
    /// Save elites every n generations
    #[arg(long)]
    checkpoint_interval: Option<usize>,
    /// Hidden layer widths of new brains, e.g. `1024,512`
    #[arg(long, value_delimiter = ',')]
    hidden: Option<Vec<usize>>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let mut store = DirectoryStore::create(&arg.checkpoint_dir)?;
    let previous = store.read_run_manifest()?;

    let start = if arg.resume {
        store.latest_generation()?.map_or(0, |generation| generation + 1)
    } else {
        arg.start.unwrap_or(0)
    };
    if start > 0 {
        let manifest = store
            .read_generation_manifest(start - 1)
            .with_context(|| format!("No checkpoint to resume generation {start} from"))?;
        info!(
            generation = manifest.record.generation,
            best = manifest.record.stats.max,
            saved_at = %manifest.saved_at,
            "resuming from checkpoint"
        );
    }

    let config = effective_config(arg, previous.map(|manifest| manifest.config))?;
    let trainer = Trainer::new(config).context("Invalid trainer configuration")?;
    store.write_run_manifest(&RunManifest {
        started_at: Utc::now(),
        start_generation: start,
        stop_generation: arg.stop,
        config: trainer.config().clone(),
    })?;

    let stop_token = StopToken::new();
    let handler_token = stop_token.clone();
    ctrlc::set_handler(move || {
        warn!("stop requested, finishing the current generation");
        handler_token.request_stop();
    })
    .context("Failed to install Ctrl-C handler")?;

    info!(
        start,
        stop = arg.stop,
        seed = trainer.config().seed,
        population = trainer.config().population,
        threads = trainer.config().threads,
        dir = %store.root().display(),
        "training"
    );
    let summary = trainer
        .run(start, arg.stop, &stop_token, &mut store)
        .context("Training failed")?;

    if let Some(record) = summary.last() {
        info!(
            generation = record.generation,
            best = record.stats.max,
            mean = record.stats.mean,
            "last generation"
        );
    }
    if summary.stopped {
        info!(
            next = summary.next_generation,
            "training stopped, continue with --resume"
        );
    } else {
        info!("training completed");
    }
    Ok(())
}

/// Configuration file (or the previous run's configuration) with command-line
/// overrides applied.
///
/// The seed is taken from `--seed`, then the configuration file, then the previous
/// run, and is derived from the clock when none of them has one.
fn effective_config(
    arg: &TrainArg,
    previous: Option<TrainerConfig>,
) -> anyhow::Result<TrainerConfig> {
    let file = arg
        .config
        .as_ref()
        .map(|path| util::read_json_file::<serde_json::Value, _>("trainer config", path))
        .transpose()?;
    let (mut config, seed) = match (file, previous) {
        (Some(value), previous) => {
            let file_has_seed = value.get("seed").is_some();
            let config: TrainerConfig =
                serde_json::from_value(value).context("Failed to parse trainer config")?;
            let seed = if file_has_seed {
                Some(config.seed)
            } else {
                previous.map(|previous| previous.seed)
            };
            (config, seed)
        }
        (None, Some(previous)) => {
            let seed = previous.seed;
            (previous, Some(seed))
        }
        (None, None) => (TrainerConfig::default(), None),
    };

    if let Some(population) = arg.population {
        config.population = population;
    }
    if let Some(elite) = arg.elite {
        config.elite_count = elite;
    }
    if let Some(threads) = arg.threads {
        config.threads = threads;
    }
    if let Some(temperature) = arg.temperature {
        config.temperature = temperature;
    }
    if let Some(interval) = arg.greedy_interval {
        config.greedy_interval = Some(interval);
    }
    if let Some(interval) = arg.checkpoint_interval {
        config.checkpoint_interval = interval;
    }
    if let Some(hidden) = &arg.hidden {
        config.hidden_layers.clone_from(hidden);
    }
    config.seed = if let Some(seed) = arg.seed.or(seed) {
        seed
    } else {
        let seed = util::clock_seed();
        info!(seed, "derived seed from the clock");
        seed
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::{fs, process};

    use clap::Parser;

    use super::*;

    #[derive(Debug, clap::Parser)]
    struct Cli {
        #[command(flatten)]
        arg: TrainArg,
    }

    fn parse(args: &[&str]) -> TrainArg {
        Cli::try_parse_from(std::iter::once("train").chain(args.iter().copied()))
            .unwrap()
            .arg
    }

    fn config_file(name: &str, json: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("gambit-cli-{}-{name}.json", process::id()));
        fs::write(&path, json).unwrap();
        path
    }

    fn previous(seed: u64) -> TrainerConfig {
        TrainerConfig {
            seed,
            population: 10,
            ..TrainerConfig::default()
        }
    }

    #[test]
    fn test_config_file_without_seed() {
        let path = config_file("no-seed", r#"{"population": 6, "elite_count": 2}"#);
        let arg = parse(&["--config", path.to_str().unwrap()]);

        let fresh = effective_config(&arg, None).unwrap();
        assert_eq!(fresh.population, 6);
        assert_eq!(fresh.elite_count, 2);
        assert_ne!(fresh.seed, 0);

        let continued = effective_config(&arg, Some(previous(77))).unwrap();
        assert_eq!(continued.population, 6);
        assert_eq!(continued.seed, 77);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_seed_precedence() {
        let path = config_file("seed", r#"{"seed": 5}"#);
        let with_file = parse(&["--config", path.to_str().unwrap()]);
        assert_eq!(effective_config(&with_file, Some(previous(77))).unwrap().seed, 5);

        let with_flag = parse(&["--config", path.to_str().unwrap(), "--seed", "9"]);
        assert_eq!(effective_config(&with_flag, Some(previous(77))).unwrap().seed, 9);
        fs::remove_file(&path).unwrap();

        let resumed = effective_config(&parse(&["--elite", "3"]), Some(previous(77))).unwrap();
        assert_eq!(resumed.seed, 77);
        assert_eq!(resumed.population, 10);
        assert_eq!(resumed.elite_count, 3);
    }

    #[test]
    fn test_overrides() {
        let arg = parse(&["--seed", "1", "--population", "12", "--hidden", "16,8"]);
        let config = effective_config(&arg, None).unwrap();
        assert_eq!(config.seed, 1);
        assert_eq!(config.population, 12);
        assert_eq!(config.hidden_layers, [16, 8]);
        assert_eq!(config.elite_count, TrainerConfig::default().elite_count);
    }
}
