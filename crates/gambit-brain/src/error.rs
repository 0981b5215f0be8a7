use std::{collections::TryReserveError, io, path::PathBuf};

use crate::CrossoverParamsError;

/// Error building or combining brains.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum BrainError {
    #[display("brain has no layers")]
    NoLayers,
    #[display("layer {layer} has zero-sized shape {input_size}x{output_size}")]
    EmptyLayer {
        layer: usize,
        input_size: usize,
        output_size: usize,
    },
    #[display("layer {layer} shape {input_size}x{output_size} is too large")]
    TooLarge {
        layer: usize,
        input_size: usize,
        output_size: usize,
    },
    #[display("layer {layer} takes {found} inputs, but the previous layer produces {expected}")]
    ChainMismatch {
        layer: usize,
        expected: usize,
        found: usize,
    },
    #[display("layer {layer} has {found} {what}, expected {expected}")]
    ParameterCount {
        layer: usize,
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[display("failed to allocate {len} parameters")]
    Allocation {
        len: usize,
        source: TryReserveError,
    },
    #[display("parent brains differ in shape at layer {layer}")]
    ShapeMismatch { layer: usize },
    #[display("softmax temperature must be finite and positive, got {temperature}")]
    InvalidTemperature { temperature: f32 },
    #[display("invalid crossover parameters")]
    InvalidCrossover { source: CrossoverParamsError },
    #[display("invalid sampling range")]
    Distribution { source: rand::distr::uniform::Error },
}

impl BrainError {
    /// Attributes a single-layer error to layer `index` of a brain.
    #[must_use]
    pub(crate) fn at_layer(mut self, index: usize) -> Self {
        match &mut self {
            Self::EmptyLayer { layer, .. }
            | Self::TooLarge { layer, .. }
            | Self::ChainMismatch { layer, .. }
            | Self::ParameterCount { layer, .. }
            | Self::ShapeMismatch { layer } => *layer = index,
            Self::NoLayers
            | Self::Allocation { .. }
            | Self::InvalidTemperature { .. }
            | Self::InvalidCrossover { .. }
            | Self::Distribution { .. } => {}
        }
        self
    }
}

/// Section of the binary format being read when decoding failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Section {
    #[display("layer count")]
    LayerCount,
    #[display("activation tag of layer {_0}")]
    Activation(usize),
    #[display("softmax temperature of layer {_0}")]
    Temperature(usize),
    #[display("input size of layer {_0}")]
    InputSize(usize),
    #[display("output size of layer {_0}")]
    OutputSize(usize),
    #[display("weights of layer {_0}")]
    Weights(usize),
    #[display("biases of layer {_0}")]
    Biases(usize),
}

/// Error decoding the binary brain format.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum DecodeBrainError {
    #[display("input truncated at byte {offset} while reading {section}")]
    Truncated { section: Section, offset: usize },
    #[display("layer count is zero")]
    NoLayers,
    #[display("layer {layer} has zero-sized shape {input_size}x{output_size}")]
    EmptyLayer {
        layer: usize,
        input_size: u64,
        output_size: u64,
    },
    #[display("layer {layer} shape {input_size}x{output_size} is too large")]
    SizeOverflow {
        layer: usize,
        input_size: u64,
        output_size: u64,
    },
    #[display("layer {layer} takes {found} inputs, but the previous layer produces {expected}")]
    ChainMismatch {
        layer: usize,
        expected: usize,
        found: usize,
    },
    #[display("layer {layer} has unknown activation tag {tag}")]
    UnknownActivation { layer: usize, tag: u8 },
    #[display("layer {layer} has invalid softmax temperature {temperature}")]
    InvalidTemperature { layer: usize, temperature: f32 },
    #[display("{count} unexpected bytes after the last layer")]
    TrailingBytes { count: usize },
    #[display("failed to build decoded layer")]
    Build { source: BrainError },
}

/// Error reading or writing a brain file.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum BrainFileError {
    #[display("failed to read brain file {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[display("failed to write brain file {}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[display("invalid brain file {}", path.display())]
    Decode {
        path: PathBuf,
        source: DecodeBrainError,
    },
}
