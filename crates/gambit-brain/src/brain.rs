use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Activation, BrainError, CrossoverParams, Layer, genetic::Crossover};

/// Width and activation of one layer in a [`Brain::random`] architecture.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LayerSpec {
    pub output_size: usize,
    pub activation: Activation,
}

impl LayerSpec {
    #[must_use]
    pub const fn new(output_size: usize, activation: Activation) -> Self {
        Self {
            output_size,
            activation,
        }
    }
}

/// Feed-forward network: an owned, non-empty stack of chained [`Layer`]s.
///
/// Every layer's input size equals the previous layer's output size. A forward pass
/// overwrites each layer's output buffer, so a brain is used by one thread at a time;
/// workers that play concurrently each hold their own clone.
///
/// # Example
///
/// ```
/// use gambit_brain::{Activation, Brain, LayerSpec};
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let mut brain = Brain::random(
///     4,
///     &[LayerSpec::new(8, Activation::Relu), LayerSpec::new(2, Activation::Identity)],
///     &mut rng,
/// )
/// .unwrap();
/// assert_eq!(brain.forward(&[0.0, 1.0, 0.0, 1.0]).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Brain {
    layers: Vec<Layer>,
}

impl Brain {
    /// Assembles a brain from layers, validating that they chain.
    pub fn new(layers: Vec<Layer>) -> Result<Self, BrainError> {
        if layers.is_empty() {
            return Err(BrainError::NoLayers);
        }
        for (i, pair) in layers.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.output_size() != next.input_size() {
                return Err(BrainError::ChainMismatch {
                    layer: i + 1,
                    expected: prev.output_size(),
                    found: next.input_size(),
                });
            }
        }
        Ok(Self { layers })
    }

    /// Randomly initialised brain taking `input_size` inputs through `specs`.
    pub fn random<R>(input_size: usize, specs: &[LayerSpec], rng: &mut R) -> Result<Self, BrainError>
    where
        R: Rng + ?Sized,
    {
        let mut layers = Vec::with_capacity(specs.len());
        let mut fan_in = input_size;
        for (i, spec) in specs.iter().enumerate() {
            let layer = Layer::random(fan_in, spec.output_size, spec.activation, rng)
                .map_err(|e| e.at_layer(i))?;
            fan_in = layer.output_size();
            layers.push(layer);
        }
        Self::new(layers)
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Layer::input_size)
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Layer::output_size)
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights().len() + l.biases().len())
            .sum()
    }

    /// Runs every layer in order and returns the last layer's output buffer.
    ///
    /// The returned slice stays valid until the next call on this brain.
    ///
    /// # Panics
    ///
    /// Panics if `input.len() != self.input_size()`.
    pub fn forward(&mut self, input: &[f32]) -> &[f32] {
        for i in 0..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            let layer = &mut rest[0];
            match done.last() {
                Some(prev) => layer.forward(prev.outputs()),
                None => layer.forward(input),
            };
        }
        match self.layers.last() {
            Some(layer) => layer.outputs(),
            None => &[],
        }
    }

    /// Produces a child of `self` and `other` by per-element blending and tiered mutation.
    ///
    /// The child has the parents' shape and takes every activation from `self`.
    /// Parents of different shape are rejected.
    pub fn offspring<R>(
        &self,
        other: &Self,
        params: &CrossoverParams,
        rng: &mut R,
    ) -> Result<Self, BrainError>
    where
        R: Rng + ?Sized,
    {
        if self.layers.len() != other.layers.len() {
            return Err(BrainError::ShapeMismatch {
                layer: self.layers.len().min(other.layers.len()),
            });
        }
        let crossover = Crossover::new(params)?;
        let layers = self
            .layers
            .iter()
            .zip(&other.layers)
            .enumerate()
            .map(|(i, (a, b))| a.offspring(b, &crossover, rng).map_err(|e| e.at_layer(i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { layers })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    fn specs() -> [LayerSpec; 2] {
        [
            LayerSpec::new(6, Activation::Relu),
            LayerSpec::new(3, Activation::Softmax { temperature: 0.5 }),
        ]
    }

    #[test]
    fn test_random_shapes() {
        let mut rng = Pcg32::seed_from_u64(1);
        let brain = Brain::random(4, &specs(), &mut rng).unwrap();
        assert_eq!(brain.layers().len(), 2);
        assert_eq!(brain.input_size(), 4);
        assert_eq!(brain.output_size(), 3);
        assert_eq!(brain.parameter_count(), 4 * 6 + 6 + 6 * 3 + 3);
    }

    #[test]
    fn test_new_rejects_bad_chains() {
        assert!(Brain::new(vec![]).unwrap_err().is_no_layers());

        let a = Layer::zeros(4, 5, Activation::Relu).unwrap();
        let b = Layer::zeros(6, 2, Activation::Identity).unwrap();
        let err = Brain::new(vec![a, b]).unwrap_err();
        assert!(matches!(
            err,
            BrainError::ChainMismatch {
                layer: 1,
                expected: 5,
                found: 6
            }
        ));
    }

    #[test]
    fn test_random_reports_layer_index() {
        let mut rng = Pcg32::seed_from_u64(1);
        let specs = [
            LayerSpec::new(6, Activation::Relu),
            LayerSpec::new(0, Activation::Identity),
        ];
        let err = Brain::random(4, &specs, &mut rng).unwrap_err();
        assert!(matches!(err, BrainError::EmptyLayer { layer: 1, .. }));
    }

    #[test]
    fn test_forward_deterministic_and_normalised() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut brain = Brain::random(4, &specs(), &mut rng).unwrap();
        let input = [1.0, -0.5, 0.25, 2.0];
        let first = brain.forward(&input).to_vec();
        let second = brain.forward(&input).to_vec();
        assert_eq!(first, second);
        let sum: f32 = first.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);

        let mut clone = brain.clone();
        assert_eq!(clone.forward(&input), first.as_slice());
    }

    #[test]
    fn test_offspring_keeps_shape() {
        let mut rng = Pcg32::seed_from_u64(3);
        let a = Brain::random(4, &specs(), &mut rng).unwrap();
        let b = Brain::random(4, &specs(), &mut rng).unwrap();
        let child = a
            .offspring(&b, &CrossoverParams::default(), &mut rng)
            .unwrap();
        assert_eq!(child.layers().len(), a.layers().len());
        for (c, p) in child.layers().iter().zip(a.layers()) {
            assert_eq!(c.input_size(), p.input_size());
            assert_eq!(c.output_size(), p.output_size());
            assert_eq!(c.activation(), p.activation());
        }
        assert_ne!(child, a);
        assert_ne!(child, b);
    }

    #[test]
    fn test_offspring_rejects_mismatched_parents() {
        let mut rng = Pcg32::seed_from_u64(4);
        let a = Brain::random(4, &specs(), &mut rng).unwrap();
        let b = Brain::random(4, &specs()[..1], &mut rng).unwrap();
        assert!(
            a.offspring(&b, &CrossoverParams::default(), &mut rng)
                .unwrap_err()
                .is_shape_mismatch()
        );

        let c = Brain::random(
            4,
            &[
                LayerSpec::new(7, Activation::Relu),
                LayerSpec::new(3, Activation::Identity),
            ],
            &mut rng,
        )
        .unwrap();
        let err = a
            .offspring(&c, &CrossoverParams::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, BrainError::ShapeMismatch { layer: 0 }));
    }

    #[test]
    fn test_offspring_rejects_invalid_params() {
        let mut rng = Pcg32::seed_from_u64(5);
        let a = Brain::random(4, &specs(), &mut rng).unwrap();
        let params = CrossoverParams {
            burst_rate: 2.0,
            ..CrossoverParams::default()
        };
        assert!(
            a.offspring(&a, &params, &mut rng)
                .unwrap_err()
                .is_invalid_crossover()
        );
    }
}
