use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::{Activation, BrainError, genetic::Crossover};

/// Dense layer: `output = activation(biases + weights · input)`.
///
/// Weights are stored row-major with the output index major, so row `i` holds the
/// `input_size` weights feeding output `i`. The output buffer is owned by the layer
/// and overwritten by every [`forward`](Self::forward) call.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    input_size: usize,
    output_size: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
    outputs: Vec<f32>,
    activation: Activation,
}

/// Allocates a zeroed buffer, reporting allocation failure instead of aborting.
fn zeroed(len: usize) -> Result<Vec<f32>, BrainError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| BrainError::Allocation { len, source })?;
    buf.resize(len, 0.0);
    Ok(buf)
}

fn check_activation(activation: Activation) -> Result<(), BrainError> {
    if let Activation::Softmax { temperature } = activation
        && !(temperature.is_finite() && temperature > 0.0)
    {
        return Err(BrainError::InvalidTemperature { temperature });
    }
    Ok(())
}

impl Layer {
    /// Creates a layer with all weights and biases set to zero.
    pub fn zeros(
        input_size: usize,
        output_size: usize,
        activation: Activation,
    ) -> Result<Self, BrainError> {
        if input_size == 0 || output_size == 0 {
            return Err(BrainError::EmptyLayer {
                layer: 0,
                input_size,
                output_size,
            });
        }
        check_activation(activation)?;
        let len = input_size
            .checked_mul(output_size)
            .ok_or(BrainError::TooLarge {
                layer: 0,
                input_size,
                output_size,
            })?;
        Ok(Self {
            input_size,
            output_size,
            weights: zeroed(len)?,
            biases: zeroed(output_size)?,
            outputs: zeroed(output_size)?,
            activation,
        })
    }

    /// Creates a layer with He-uniform weights in `±sqrt(2 / input_size)` and zero biases.
    #[expect(clippy::cast_precision_loss)]
    pub fn random<R>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, BrainError>
    where
        R: Rng + ?Sized,
    {
        let mut layer = Self::zeros(input_size, output_size, activation)?;
        let limit = (2.0 / input_size as f32).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit)
            .map_err(|source| BrainError::Distribution { source })?;
        for w in &mut layer.weights {
            *w = dist.sample(rng);
        }
        Ok(layer)
    }

    /// Builds a layer from explicit parameters.
    ///
    /// `weights` must hold `input_size * biases.len()` values.
    pub fn from_parts(
        input_size: usize,
        weights: Vec<f32>,
        biases: Vec<f32>,
        activation: Activation,
    ) -> Result<Self, BrainError> {
        let output_size = biases.len();
        if input_size == 0 || output_size == 0 {
            return Err(BrainError::EmptyLayer {
                layer: 0,
                input_size,
                output_size,
            });
        }
        check_activation(activation)?;
        let expected = input_size.saturating_mul(output_size);
        if weights.len() != expected {
            return Err(BrainError::ParameterCount {
                layer: 0,
                what: "weights",
                expected,
                found: weights.len(),
            });
        }
        Ok(Self {
            input_size,
            output_size,
            weights,
            biases,
            outputs: zeroed(output_size)?,
            activation,
        })
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Output of the most recent forward pass; zeros before the first one.
    #[must_use]
    pub fn outputs(&self) -> &[f32] {
        &self.outputs
    }

    /// Runs the layer on `input` and returns its output buffer.
    ///
    /// # Panics
    ///
    /// Panics if `input.len() != self.input_size()`.
    pub fn forward(&mut self, input: &[f32]) -> &[f32] {
        assert_eq!(input.len(), self.input_size);
        let rows = self.weights.chunks_exact(self.input_size);
        for ((out, row), bias) in self.outputs.iter_mut().zip(rows).zip(&self.biases) {
            *out = bias + row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>();
        }
        self.activation.apply(&mut self.outputs);
        &self.outputs
    }

    /// Same-shape child of `self` and `other`; the activation is taken from `self`.
    pub(crate) fn offspring<R>(
        &self,
        other: &Self,
        crossover: &Crossover,
        rng: &mut R,
    ) -> Result<Self, BrainError>
    where
        R: Rng + ?Sized,
    {
        if (self.input_size, self.output_size) != (other.input_size, other.output_size) {
            return Err(BrainError::ShapeMismatch { layer: 0 });
        }
        let mut child = Self::zeros(self.input_size, self.output_size, self.activation)?;
        crossover.blend_into(&self.weights, &other.weights, &mut child.weights, rng);
        crossover.blend_into(&self.biases, &other.biases, &mut child.biases, rng);
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_forward_affine() {
        let mut layer = Layer::from_parts(
            3,
            vec![1.0, 0.0, -1.0, 0.5, 0.5, 0.5],
            vec![0.5, -10.0],
            Activation::Identity,
        )
        .unwrap();
        assert_eq!(layer.output_size(), 2);
        assert_eq!(layer.forward(&[1.0, 2.0, 3.0]), &[-1.5, -7.0]);

        let mut relu = Layer::from_parts(
            3,
            layer.weights().to_vec(),
            layer.biases().to_vec(),
            Activation::Relu,
        )
        .unwrap();
        assert_eq!(relu.forward(&[1.0, 2.0, 3.0]), &[0.0, 0.0]);
    }

    #[test]
    fn test_forward_is_deterministic() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut layer = Layer::random(16, 8, Activation::Relu, &mut rng).unwrap();
        let input: Vec<f32> = (0..16_u8).map(|i| f32::from(i).sin()).collect();
        let first = layer.forward(&input).to_vec();
        let second = layer.forward(&input).to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_init_range() {
        let mut rng = Pcg32::seed_from_u64(5);
        let layer = Layer::random(8, 32, Activation::Identity, &mut rng).unwrap();
        let limit = 0.5_f32;
        assert_eq!(layer.weights().len(), 8 * 32);
        assert!(layer.weights().iter().all(|w| w.abs() <= limit));
        assert!(layer.weights().iter().any(|w| *w != 0.0));
        assert!(layer.biases().iter().all(|b| *b == 0.0));
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(Layer::zeros(0, 4, Activation::Identity).unwrap_err().is_empty_layer());
        assert!(Layer::zeros(4, 0, Activation::Identity).unwrap_err().is_empty_layer());
        assert!(
            Layer::zeros(4, 4, Activation::Softmax { temperature: 0.0 })
                .unwrap_err()
                .is_invalid_temperature()
        );
        assert!(
            Layer::from_parts(2, vec![0.0; 3], vec![0.0; 2], Activation::Relu)
                .unwrap_err()
                .is_parameter_count()
        );
    }

    #[test]
    fn test_offspring_shape() {
        let mut rng = Pcg32::seed_from_u64(9);
        let a = Layer::random(4, 3, Activation::Relu, &mut rng).unwrap();
        let b = Layer::random(4, 3, Activation::Identity, &mut rng).unwrap();
        let crossover = Crossover::new(&crate::CrossoverParams::default()).unwrap();
        let child = a.offspring(&b, &crossover, &mut rng).unwrap();
        assert_eq!(child.input_size(), 4);
        assert_eq!(child.output_size(), 3);
        assert_eq!(child.activation(), Activation::Relu);

        let c = Layer::random(3, 4, Activation::Relu, &mut rng).unwrap();
        assert!(a.offspring(&c, &crossover, &mut rng).unwrap_err().is_shape_mismatch());
    }
}
