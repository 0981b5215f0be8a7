//! Chess board representation and move legality.
//!
//! - [`core`] - squares, positions, moves and the 8×8 [`Board`]
//! - [`rules`] - [`GameState`] with legality, check detection and move application
//!
//! The engine knows nothing about turns, clocks or game results: callers drive the
//! game by alternating colours and deciding when it ends.

pub use self::{core::*, rules::*};

pub mod core;
pub mod rules;
