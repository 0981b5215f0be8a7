//! Elitist evolution of brain populations.
//!
//! After a generation has been ranked, the top `elite_count` brains survive unchanged.
//! Every other slot is refilled with the offspring of two distinct elites picked
//! uniformly at random, and the new population is shuffled so that group-based
//! scheduling does not keep pitting the same indices against each other.
//!
//! # Example
//!
//! ```
//! use gambit_brain::CrossoverParams;
//! use gambit_training::genetic::{Population, PopulationEvolver};
//! use rand::SeedableRng;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(5);
//! let population = Population::random(6, &[4], &mut rng).unwrap();
//! let evolver = PopulationEvolver {
//!     elite_count: 2,
//!     crossover: CrossoverParams::default(),
//! };
//!
//! let ranking = [3, 1, 0, 2, 4, 5];
//! let next = evolver.evolve(&population, &ranking, &mut rng).unwrap();
//! assert_eq!(next.len(), 6);
//! ```

use gambit_brain::{Brain, BrainError, CrossoverParams};
use gambit_evaluator::new_chess_brain;
use rand::{Rng, seq::SliceRandom};

/// The brains of one generation, indexed by population index.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    brains: Vec<Brain>,
}

impl Population {
    #[must_use]
    pub fn new(brains: Vec<Brain>) -> Self {
        Self { brains }
    }

    /// `size` freshly initialised chess brains with the given hidden layer widths.
    pub fn random<R>(size: usize, hidden_layers: &[usize], rng: &mut R) -> Result<Self, BrainError>
    where
        R: Rng + ?Sized,
    {
        let brains = (0..size)
            .map(|_| new_chess_brain(hidden_layers, rng))
            .collect::<Result<_, _>>()?;
        Ok(Self { brains })
    }

    #[must_use]
    pub fn brains(&self) -> &[Brain] {
        &self.brains
    }

    #[must_use]
    pub fn into_brains(self) -> Vec<Brain> {
        self.brains
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.brains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brains.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    pub elite_count: usize,
    pub crossover: CrossoverParams,
}

impl PopulationEvolver {
    /// Next generation of `population` given its `ranking` (best first).
    pub fn evolve<R>(
        &self,
        population: &Population,
        ranking: &[usize],
        rng: &mut R,
    ) -> Result<Population, BrainError>
    where
        R: Rng + ?Sized,
    {
        let elites = ranking
            .iter()
            .take(self.elite_count)
            .map(|&i| population.brains[i].clone())
            .collect::<Vec<_>>();
        self.breed(elites, population.len(), rng)
    }

    /// Fills a population of `size` brains from `elites`.
    ///
    /// The elites are kept as they are; the remaining slots hold offspring of two
    /// distinct elites. With a single elite the offspring have that elite as both
    /// parents. The result is shuffled.
    pub fn breed<R>(
        &self,
        elites: Vec<Brain>,
        size: usize,
        rng: &mut R,
    ) -> Result<Population, BrainError>
    where
        R: Rng + ?Sized,
    {
        let mut brains = elites;
        let elite_count = brains.len();
        if elite_count == 0 {
            return Ok(Population::new(brains));
        }

        brains.reserve(size.saturating_sub(elite_count));
        while brains.len() < size {
            let a = rng.random_range(0..elite_count);
            let mut b = rng.random_range(0..elite_count);
            while elite_count > 1 && b == a {
                b = rng.random_range(0..elite_count);
            }
            let child = brains[a].offspring(&brains[b], &self.crossover, rng)?;
            brains.push(child);
        }

        brains.shuffle(rng);
        Ok(Population::new(brains))
    }
}
