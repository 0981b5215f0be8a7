//! Genetic operators over network parameters.
//!
//! Offspring are produced element by element from two parents of identical shape:
//!
//! 1. **Blend** - `child = alpha * a + (1 - alpha) * b`, with `alpha` drawn uniformly
//!    from `[alpha_min, alpha_max]` for every element
//! 2. **Mutate** - a fresh draw `r` in `[0, 1)` picks at most one perturbation tier:
//!    - `r < burst_rate`: add `N(0, burst_sigma)` (rare, large "burst")
//!    - `r < burst_rate + mutation_rate`: add `N(0, mutation_sigma)` (standard)
//!    - otherwise the blended value is kept
//!
//! Gaussian noise comes from [`BoxMuller`], a Box–Muller transform over two
//! independent uniform draws.
//!
//! [`Brain::offspring`](crate::Brain::offspring) applies these operators to every
//! weight and bias of every layer.

use std::f32::consts::TAU;

use rand::Rng;
use rand_distr::{Distribution, OpenClosed01, Uniform};
use serde::{Deserialize, Serialize};

use crate::BrainError;

/// Parameters of the crossover and mutation operators.
///
/// # Example
///
/// ```
/// use gambit_brain::CrossoverParams;
///
/// let params = CrossoverParams::default();
/// assert!(params.validate().is_ok());
///
/// let inverted = CrossoverParams { alpha_min: 0.7, alpha_max: 0.3, ..params };
/// assert!(inverted.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrossoverParams {
    /// Lower bound of the per-element blending coefficient.
    pub alpha_min: f32,
    /// Upper bound of the per-element blending coefficient.
    pub alpha_max: f32,
    /// Probability of the standard mutation tier.
    pub mutation_rate: f32,
    /// Standard deviation of the standard mutation tier.
    pub mutation_sigma: f32,
    /// Probability of the burst mutation tier.
    pub burst_rate: f32,
    /// Standard deviation of the burst mutation tier.
    pub burst_sigma: f32,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        Self {
            alpha_min: 0.2,
            alpha_max: 0.6,
            mutation_rate: 0.15,
            mutation_sigma: 0.02,
            burst_rate: 0.05,
            burst_sigma: 0.2,
        }
    }
}

/// Invalid [`CrossoverParams`].
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum CrossoverParamsError {
    #[display("alpha band [{min}, {max}] must lie within [0, 1] with min <= max")]
    AlphaBand { min: f32, max: f32 },
    #[display("{name} must be a probability in [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },
    #[display("mutation probabilities sum to {sum}, which exceeds 1")]
    ProbabilitySum { sum: f32 },
    #[display("{name} must be finite and non-negative, got {value}")]
    Sigma { name: &'static str, value: f32 },
}

impl CrossoverParams {
    pub fn validate(&self) -> Result<(), CrossoverParamsError> {
        let unit = 0.0..=1.0;
        if !(unit.contains(&self.alpha_min)
            && unit.contains(&self.alpha_max)
            && self.alpha_min <= self.alpha_max)
        {
            return Err(CrossoverParamsError::AlphaBand {
                min: self.alpha_min,
                max: self.alpha_max,
            });
        }
        for (name, value) in [
            ("mutation_rate", self.mutation_rate),
            ("burst_rate", self.burst_rate),
        ] {
            if !unit.contains(&value) {
                return Err(CrossoverParamsError::Probability { name, value });
            }
        }
        let sum = self.mutation_rate + self.burst_rate;
        if sum > 1.0 {
            return Err(CrossoverParamsError::ProbabilitySum { sum });
        }
        for (name, value) in [
            ("mutation_sigma", self.mutation_sigma),
            ("burst_sigma", self.burst_sigma),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CrossoverParamsError::Sigma { name, value });
            }
        }
        Ok(())
    }
}

/// Zero-mean Gaussian noise generated with the Box–Muller transform.
///
/// The radius draw comes from `(0, 1]` so its logarithm is always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMuller {
    sigma: f32,
}

impl BoxMuller {
    #[must_use]
    pub const fn new(sigma: f32) -> Self {
        Self { sigma }
    }

    #[must_use]
    pub const fn sigma(&self) -> f32 {
        self.sigma
    }
}

impl Distribution<f32> for BoxMuller {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let u1: f32 = rng.sample(OpenClosed01);
        let u2: f32 = rng.random();
        (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos() * self.sigma
    }
}

/// Crossover operator prepared from validated [`CrossoverParams`].
#[derive(Debug, Clone)]
pub(crate) struct Crossover {
    alpha: Uniform<f32>,
    mutation: BoxMuller,
    burst: BoxMuller,
    mutation_rate: f32,
    burst_rate: f32,
}

impl Crossover {
    pub(crate) fn new(params: &CrossoverParams) -> Result<Self, BrainError> {
        params
            .validate()
            .map_err(|source| BrainError::InvalidCrossover { source })?;
        let alpha = Uniform::new_inclusive(params.alpha_min, params.alpha_max)
            .map_err(|source| BrainError::Distribution { source })?;
        Ok(Self {
            alpha,
            mutation: BoxMuller::new(params.mutation_sigma),
            burst: BoxMuller::new(params.burst_sigma),
            mutation_rate: params.mutation_rate,
            burst_rate: params.burst_rate,
        })
    }

    /// Writes the blended and mutated children of `a` and `b` into `child`.
    ///
    /// # Panics
    ///
    /// Panics if the three slices differ in length.
    pub(crate) fn blend_into<R>(&self, a: &[f32], b: &[f32], child: &mut [f32], rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        assert_eq!(a.len(), b.len());
        assert_eq!(a.len(), child.len());
        for ((c, &x), &y) in child.iter_mut().zip(a).zip(b) {
            let alpha = self.alpha.sample(rng);
            *c = alpha * x + (1.0 - alpha) * y + self.mutation_noise(rng);
        }
    }

    fn mutation_noise<R>(&self, rng: &mut R) -> f32
    where
        R: Rng + ?Sized,
    {
        let r: f32 = rng.random();
        if r < self.burst_rate {
            self.burst.sample(rng)
        } else if r < self.burst_rate + self.mutation_rate {
            self.mutation.sample(rng)
        } else {
            0.0
        }
    }
}
