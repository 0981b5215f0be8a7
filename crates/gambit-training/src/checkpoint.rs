//! Where elites go between generations.
//!
//! The trainer only knows checkpoints by [`CheckpointSlot`]; naming and storage
//! belong to the [`CheckpointStore`] implementation. [`MemoryStore`] keeps everything
//! in memory, in the same binary format the file-based stores use.

use std::{collections::HashMap, error::Error};

use gambit_brain::Brain;
use gambit_evaluator::MoveSelection;
use serde::{Deserialize, Serialize};

use crate::stats::FitnessStats;

/// Handle of one saved brain: the elite of rank `rank` (0 is best) in `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CheckpointSlot {
    pub generation: u64,
    pub rank: usize,
}

/// Summary of a finished generation, handed to the store with its elites.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerationRecord {
    pub generation: u64,
    pub seed: u64,
    /// Number of matches played.
    pub matches: usize,
    pub selection: MoveSelection,
    pub stats: FitnessStats,
    /// Fitness of the saved elites, best first.
    pub elite_fitness: Vec<f32>,
}

/// Persistence of elites.
///
/// For a checkpointed generation the trainer saves every elite and then calls
/// [`finish_generation`](Self::finish_generation) once.
pub trait CheckpointStore {
    fn save(&mut self, slot: CheckpointSlot, brain: &Brain) -> Result<(), CheckpointError>;

    fn load(&mut self, slot: CheckpointSlot) -> Result<Brain, CheckpointError>;

    fn finish_generation(&mut self, record: &GenerationRecord) -> Result<(), CheckpointError>;
}

/// Failure reported by a [`CheckpointStore`].
#[derive(Debug, derive_more::Display)]
#[display("{message}")]
pub struct CheckpointError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl CheckpointError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

// `Box<dyn Error>` is not itself an `Error`, so the source is exposed by hand.
impl Error for CheckpointError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

/// In-memory [`CheckpointStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    brains: HashMap<CheckpointSlot, Vec<u8>>,
    records: Vec<GenerationRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of finished generations, in the order they were saved.
    #[must_use]
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    #[must_use]
    pub fn contains(&self, slot: CheckpointSlot) -> bool {
        self.brains.contains_key(&slot)
    }
}

impl CheckpointStore for MemoryStore {
    fn save(&mut self, slot: CheckpointSlot, brain: &Brain) -> Result<(), CheckpointError> {
        self.brains.insert(slot, brain.to_bytes());
        Ok(())
    }

    fn load(&mut self, slot: CheckpointSlot) -> Result<Brain, CheckpointError> {
        let bytes = self.brains.get(&slot).ok_or_else(|| {
            CheckpointError::new(format!(
                "no brain saved for rank {} of generation {}",
                slot.rank, slot.generation
            ))
        })?;
        Brain::from_bytes(bytes)
            .map_err(|e| CheckpointError::with_source("saved brain is corrupt", e))
    }

    fn finish_generation(&mut self, record: &GenerationRecord) -> Result<(), CheckpointError> {
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gambit_brain::{Activation, LayerSpec};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut rng = Pcg32::seed_from_u64(0);
        let brain = Brain::random(3, &[LayerSpec::new(2, Activation::Relu)], &mut rng).unwrap();
        let slot = CheckpointSlot {
            generation: 4,
            rank: 1,
        };
        let mut store = MemoryStore::new();
        store.save(slot, &brain).unwrap();
        assert!(store.contains(slot));
        assert_eq!(store.load(slot).unwrap(), brain);
    }

    #[test]
    fn test_memory_store_missing_slot() {
        let mut store = MemoryStore::new();
        let err = store
            .load(CheckpointSlot {
                generation: 2,
                rank: 0,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "no brain saved for rank 0 of generation 2");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_error_source_chain() {
        let err = CheckpointError::with_source(
            "cannot read brain",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "cannot read brain");
        assert_eq!(err.source().unwrap().to_string(), "gone");
    }
}
