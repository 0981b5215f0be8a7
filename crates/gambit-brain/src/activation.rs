use serde::{Deserialize, Serialize};

/// Activation applied to a layer's outputs after the affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, derive_more::IsVariant)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activation {
    /// Pass-through.
    Identity,
    /// `max(0, x)` elementwise.
    Relu,
    /// Temperature-scaled softmax over the whole output vector.
    Softmax { temperature: f32 },
}

impl Activation {
    /// Applies the activation in place.
    pub fn apply(self, values: &mut [f32]) {
        match self {
            Self::Identity => {}
            Self::Relu => {
                for v in values {
                    *v = v.max(0.0);
                }
            }
            Self::Softmax { temperature } => softmax(values, temperature),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Relu => "relu",
            Self::Softmax { .. } => "softmax",
        }
    }
}

/// Temperature-scaled softmax, in place.
///
/// Computes `exp((x - max) / temperature)` for every logit, then normalises to sum
/// to 1. `temperature` must be positive. Negative-infinity logits get probability 0;
/// if every logit is negative infinity the result is all zeros.
pub fn softmax(values: &mut [f32], temperature: f32) {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        values.fill(0.0);
        return;
    }

    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = ((*v - max) / temperature).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}
