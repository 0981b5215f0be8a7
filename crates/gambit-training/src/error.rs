use gambit_brain::BrainError;
use gambit_evaluator::{MatchError, PolicyError};

use crate::{checkpoint::CheckpointError, config::ConfigError};

/// Error aborting a training run.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("invalid trainer configuration")]
    InvalidConfig { source: ConfigError },
    #[display("generation range {start}..{stop} is reversed")]
    InvalidRange { start: u64, stop: u64 },
    #[display("population is empty")]
    EmptyPopulation,
    #[display("failed to build brains")]
    Brain { source: BrainError },
    #[display("elite {rank} of generation {generation} cannot play chess")]
    IncompatibleBrain {
        generation: u64,
        rank: usize,
        source: PolicyError,
    },
    #[display("match {match_id} failed")]
    Match { match_id: usize, source: MatchError },
    #[display("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
    #[display("no result was produced for match {match_id}")]
    MissingResult { match_id: usize },
    #[display("failed to load checkpoint of generation {generation}")]
    LoadCheckpoint {
        generation: u64,
        source: CheckpointError,
    },
    #[display("failed to save checkpoint of generation {generation}")]
    SaveCheckpoint {
        generation: u64,
        source: CheckpointError,
    },
}
