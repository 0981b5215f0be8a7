use std::{num::NonZeroUsize, thread};

use gambit_brain::{CrossoverParams, CrossoverParamsError};
use gambit_evaluator::{DEFAULT_HIDDEN_LAYERS, MatchConfig, MoveSelection};
use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;

/// Everything a training run needs besides its generation range.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Number of brains per generation.
    pub population: usize,
    /// Number of top-ranked brains kept unchanged and used as parents.
    pub elite_count: usize,
    /// Number of worker threads playing matches.
    pub threads: usize,
    /// Global seed of every random stream.
    pub seed: u64,
    pub schedule: Schedule,
    pub matches: MatchConfig,
    /// Softmax temperature of sampled move selection.
    pub temperature: f32,
    /// Every `n`-th generation plays greedily instead of sampling.
    pub greedy_interval: Option<usize>,
    pub crossover: CrossoverParams,
    /// Hidden layer widths of newly created brains.
    pub hidden_layers: Vec<usize>,
    /// Elites are checkpointed every `n` generations.
    pub checkpoint_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            population: 32,
            elite_count: 8,
            threads: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            seed: 0,
            schedule: Schedule::default(),
            matches: MatchConfig::default(),
            temperature: 1.0,
            greedy_interval: None,
            crossover: CrossoverParams::default(),
            hidden_layers: DEFAULT_HIDDEN_LAYERS.to_vec(),
            checkpoint_interval: 1,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population must hold at least 2 brains, got {population}")]
    Population { population: usize },
    #[display("elite count must be in 2..{population}, got {elite_count}")]
    EliteCount {
        elite_count: usize,
        population: usize,
    },
    #[display("worker thread count must be positive")]
    Threads,
    #[display("round-robin group size must be at least 2, got {group_size}")]
    GroupSize { group_size: usize },
    #[display("games per brain must be positive")]
    GamesPerBrain,
    #[display("temperature must be positive and finite, got {temperature}")]
    Temperature { temperature: f32 },
    #[display("greedy interval must be positive")]
    GreedyInterval,
    #[display("checkpoint interval must be positive")]
    CheckpointInterval,
    #[display("invalid crossover parameters")]
    Crossover { source: CrossoverParamsError },
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population < 2 {
            return Err(ConfigError::Population {
                population: self.population,
            });
        }
        if self.elite_count < 2 || self.elite_count >= self.population {
            return Err(ConfigError::EliteCount {
                elite_count: self.elite_count,
                population: self.population,
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::Threads);
        }
        match self.schedule {
            Schedule::RoundRobin { group_size } if group_size < 2 => {
                return Err(ConfigError::GroupSize { group_size });
            }
            Schedule::Random { games_per_brain: 0 } => return Err(ConfigError::GamesPerBrain),
            Schedule::RoundRobin { .. } | Schedule::Random { .. } => {}
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(ConfigError::Temperature {
                temperature: self.temperature,
            });
        }
        if self.greedy_interval == Some(0) {
            return Err(ConfigError::GreedyInterval);
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::CheckpointInterval);
        }
        self.crossover
            .validate()
            .map_err(|source| ConfigError::Crossover { source })
    }

    /// Move selection used by every match of `generation`.
    #[must_use]
    pub fn selection(&self, generation: u64) -> MoveSelection {
        match self.greedy_interval {
            Some(n) if (generation + 1) % n as u64 == 0 => MoveSelection::Greedy,
            _ => MoveSelection::Sample {
                temperature: self.temperature,
            },
        }
    }

    /// Whether the elites of `generation` are checkpointed on the periodic schedule.
    #[must_use]
    pub fn is_checkpoint_generation(&self, generation: u64) -> bool {
        (generation + 1) % self.checkpoint_interval as u64 == 0
    }
}
