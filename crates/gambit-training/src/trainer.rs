//! The generation loop.
//!
//! ```text
//! initialise (or resume from checkpointed elites)
//!     ↓
//! ┌─> schedule → play (parallel) → aggregate → rank → checkpoint?
//! │       ↓
//! │   stop requested or budget reached? ── yes ──> done
//! │       ↓ no
//! └── keep elites + offspring → shuffle
//! ```

use gambit_brain::Brain;
use gambit_evaluator::check_chess_brain;
use tracing::{debug, info};

use crate::{
    arena::Arena,
    checkpoint::{CheckpointError, CheckpointSlot, CheckpointStore, GenerationRecord},
    config::TrainerConfig,
    error::TrainingError,
    fitness,
    genetic::{Population, PopulationEvolver},
    schedule::Pairing,
    stats::FitnessStats,
    stop::StopToken,
    streams::{self, Stream},
};

/// What a call to [`Trainer::run`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Generation a later run should start from to continue this one.
    pub next_generation: u64,
    /// Whether the run ended early because a stop was requested.
    pub stopped: bool,
    /// Records of the generations played, in order.
    pub records: Vec<GenerationRecord>,
}

impl TrainingSummary {
    /// Record of the last generation played.
    #[must_use]
    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }
}

#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self, TrainingError> {
        config
            .validate()
            .map_err(|source| TrainingError::InvalidConfig { source })?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    fn evolver(&self) -> PopulationEvolver {
        PopulationEvolver {
            elite_count: self.config.elite_count,
            crossover: self.config.crossover,
        }
    }

    /// Runs generations `start..stop`.
    ///
    /// Generation 0 starts from random brains. A later start generation rebuilds its
    /// population from the elites checkpointed for the generation before it, exactly
    /// as an uninterrupted run would have. The stop token is checked after each
    /// generation; the generation that observes it is checkpointed and the run ends.
    pub fn run(
        &self,
        start: u64,
        stop: u64,
        stop_token: &StopToken,
        store: &mut dyn CheckpointStore,
    ) -> Result<TrainingSummary, TrainingError> {
        if start > stop {
            return Err(TrainingError::InvalidRange { start, stop });
        }
        let mut summary = TrainingSummary {
            next_generation: start,
            stopped: false,
            records: vec![],
        };
        if start == stop {
            return Ok(summary);
        }

        let config = &self.config;
        let evolver = self.evolver();
        let mut population = if start == 0 {
            info!(
                population = config.population,
                seed = config.seed,
                "initialising population"
            );
            let mut rng = streams::rng(config.seed, Stream::Init);
            Population::random(config.population, &config.hidden_layers, &mut rng)
                .map_err(|source| TrainingError::Brain { source })?
        } else {
            self.resume(start - 1, store)?
        };

        for generation in start..stop {
            let mut rng = streams::rng(config.seed, Stream::Schedule { generation });
            let pairings = config.schedule.pairings(population.len(), &mut rng);
            let (record, ranking) = self.play_generation(generation, &population, &pairings)?;

            let stop_requested = stop_token.is_stop_requested();
            let last = stop_requested || generation + 1 == stop;
            if last || config.is_checkpoint_generation(generation) {
                self.checkpoint(&population, &ranking, &record, store)?;
            }
            summary.records.push(record);
            summary.next_generation = generation + 1;

            if stop_requested {
                info!(generation, "stop requested, ending run");
                summary.stopped = true;
                break;
            }
            if !last {
                let mut rng = streams::rng(config.seed, Stream::Breed { generation });
                population = evolver
                    .evolve(&population, &ranking, &mut rng)
                    .map_err(|source| TrainingError::Brain { source })?;
            }
        }
        Ok(summary)
    }

    fn play_generation(
        &self,
        generation: u64,
        population: &Population,
        pairings: &[Pairing],
    ) -> Result<(GenerationRecord, Vec<usize>), TrainingError> {
        let config = &self.config;
        let selection = config.selection(generation);
        let arena = Arena {
            matches: &config.matches,
            selection,
            seed: config.seed,
            generation,
            threads: config.threads,
        };
        debug!(generation, matches = pairings.len(), ?selection, "playing generation");
        let results = arena.play(population.brains(), pairings)?;

        let fitness = fitness::aggregate(population.len(), &results);
        let ranking = fitness::rank(&fitness);
        let stats =
            FitnessStats::new(fitness.iter().copied()).ok_or(TrainingError::EmptyPopulation)?;
        info!(
            generation,
            matches = results.len(),
            best = stats.max,
            mean = stats.mean,
            median = stats.median,
            worst = stats.min,
            std_dev = stats.std_dev,
            "generation finished"
        );

        let record = GenerationRecord {
            generation,
            seed: config.seed,
            matches: results.len(),
            selection,
            stats,
            elite_fitness: ranking
                .iter()
                .take(config.elite_count)
                .map(|&i| fitness[i])
                .collect(),
        };
        Ok((record, ranking))
    }

    fn checkpoint(
        &self,
        population: &Population,
        ranking: &[usize],
        record: &GenerationRecord,
        store: &mut dyn CheckpointStore,
    ) -> Result<(), TrainingError> {
        let generation = record.generation;
        let save_error =
            |source: CheckpointError| TrainingError::SaveCheckpoint { generation, source };
        for (rank, &index) in ranking.iter().take(self.config.elite_count).enumerate() {
            let slot = CheckpointSlot { generation, rank };
            store
                .save(slot, &population.brains()[index])
                .map_err(save_error)?;
        }
        store.finish_generation(record).map_err(save_error)?;
        debug!(generation, elites = self.config.elite_count, "checkpoint saved");
        Ok(())
    }

    /// Population of generation `generation + 1`, bred from the elites saved for
    /// `generation`.
    fn resume(
        &self,
        generation: u64,
        store: &mut dyn CheckpointStore,
    ) -> Result<Population, TrainingError> {
        let elites = (0..self.config.elite_count)
            .map(|rank| -> Result<Brain, TrainingError> {
                let brain = store
                    .load(CheckpointSlot { generation, rank })
                    .map_err(|source| TrainingError::LoadCheckpoint { generation, source })?;
                check_chess_brain(&brain).map_err(|source| TrainingError::IncompatibleBrain {
                    generation,
                    rank,
                    source,
                })?;
                Ok(brain)
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            generation,
            elites = elites.len(),
            "resuming from checkpointed elites"
        );

        let mut rng = streams::rng(self.config.seed, Stream::Breed { generation });
        self.evolver()
            .breed(elites, self.config.population, &mut rng)
            .map_err(|source| TrainingError::Brain { source })
    }
}
