//! Feed-forward networks evolved by self-play.
//!
//! A [`Brain`] is a stack of dense [`Layer`]s, each followed by an [`Activation`]
//! (identity, ReLU or temperature-scaled softmax). Brains are never trained by
//! gradients: new brains come from [`Brain::random`] (He-uniform initialisation) or
//! from [`Brain::offspring`], which blends two parents element by element and applies
//! tiered Gaussian mutation (see [`genetic`]).
//!
//! # Persistence
//!
//! Brains serialise to a compact little-endian binary format (see [`codec`]).
//! [`Brain::save`] / [`Brain::load`] work on files, [`Brain::to_bytes`] /
//! [`Brain::from_bytes`] on buffers. Decoding validates every size and the chaining
//! between layers and never yields a partially built brain.
//!
//! # Threading
//!
//! [`Brain::forward`] reuses per-layer output buffers and therefore takes `&mut self`.
//! Concurrent players each work on their own clone.

pub use self::{activation::*, brain::*, error::*, genetic::*, layer::*};

mod activation;
mod brain;
pub mod codec;
mod error;
pub mod genetic;
mod layer;
