//! Playing chess with evolved brains.
//!
//! This crate connects [`gambit_brain`] networks to the [`gambit_engine`] rules:
//!
//! 1. **Encoding** ([`encoding`]) - a board becomes 768 one-hot inputs (12 planes of 64
//!    squares), and the network answers with 4096 scores, one per (source, destination)
//!    move index.
//!
//! 2. **Move policy** ([`MovePolicy`]) - scores of moves that are not check-safe for the
//!    side to move are masked out; the move is then sampled from a temperature-scaled
//!    softmax or chosen greedily.
//!
//! 3. **Games** ([`game`]) - two policies play a full game; each side earns points for
//!    captures, promotions, central squares and checkmate.
//!
//! # Architecture
//!
//! ```text
//! MatchPlay (one game, scoring)
//!     ↓ asks
//! MovePolicy (masking, sampling)
//!     ↓ runs
//! Brain forward pass + GameState::safe_move
//! ```
//!
//! # Example
//!
//! ```
//! use gambit_evaluator::{MatchConfig, MoveSelection, MovePolicy, new_chess_brain, play_match};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let brain = new_chess_brain(&[8], &mut rng).unwrap();
//! let mut white = MovePolicy::new(brain.clone()).unwrap();
//! let mut black = MovePolicy::new(brain).unwrap();
//! let config = MatchConfig { max_plies: 4, ..MatchConfig::default() };
//!
//! let outcome = play_match(&mut white, &mut black, MoveSelection::Greedy, &config, &mut rng).unwrap();
//! assert!(outcome.plies() <= 4);
//! ```

pub use self::{game::*, policy::*};

pub mod encoding;
pub mod game;
mod policy;
