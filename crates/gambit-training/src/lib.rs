//! Evolving chess brains through self-play.
//!
//! A [`Trainer`] keeps a population of brains and improves it generation by
//! generation:
//!
//! 1. **Schedule** ([`schedule`]) - pair brains up, either round-robin within groups or
//!    randomly with a game quota per brain
//! 2. **Play** ([`arena`]) - play every pairing on a pool of worker threads
//! 3. **Fitness** ([`fitness`]) - each brain earns its own score minus its opponent's,
//!    summed over its games, and the population is ranked
//! 4. **Checkpoint** ([`checkpoint`]) - the elites are handed to a [`CheckpointStore`]
//! 5. **Evolve** ([`genetic`]) - elites survive, offspring of elite pairs fill the rest,
//!    and the population is shuffled
//!
//! # Architecture
//!
//! ```text
//! Trainer (generation loop, stop token, resume)
//!     ↓ uses
//! Schedule → Arena → fitness → PopulationEvolver
//!     ↓ plays with                 ↓ breeds with
//! gambit-evaluator (MatchPlay)    gambit-brain (Brain::offspring)
//! ```
//!
//! # Reproducibility
//!
//! All randomness comes from [`streams`], derived from [`TrainerConfig::seed`]. Given
//! the same configuration, a run produces the same populations regardless of the
//! number of worker threads, and a run resumed from a checkpoint continues exactly as
//! the uninterrupted run would have.
//!
//! # Example
//!
//! ```
//! use gambit_evaluator::MatchConfig;
//! use gambit_training::{MemoryStore, StopToken, Trainer, TrainerConfig};
//!
//! let config = TrainerConfig {
//!     population: 4,
//!     elite_count: 2,
//!     threads: 2,
//!     hidden_layers: vec![4],
//!     matches: MatchConfig { max_plies: 4, ..MatchConfig::default() },
//!     ..TrainerConfig::default()
//! };
//! let trainer = Trainer::new(config).unwrap();
//! let mut store = MemoryStore::new();
//!
//! let summary = trainer.run(0, 2, &StopToken::new(), &mut store).unwrap();
//! assert_eq!(summary.next_generation, 2);
//! ```

pub use self::{
    checkpoint::{CheckpointError, CheckpointSlot, CheckpointStore, GenerationRecord, MemoryStore},
    config::*,
    error::*,
    schedule::{Pairing, Schedule},
    stats::FitnessStats,
    stop::StopToken,
    trainer::*,
};

pub mod arena;
pub mod checkpoint;
mod config;
mod error;
pub mod fitness;
pub mod genetic;
pub mod schedule;
mod stats;
mod stop;
pub mod streams;
mod trainer;
