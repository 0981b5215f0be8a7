//! Chess rules over a [`GameState`].
//!
//! - [`GameState::legal_move`] classifies a move by the movement rules of the piece
//!   on its source square, including castling and en passant
//! - [`GameState::is_check`] tells whether a colour's king is attacked
//! - [`GameState::safe_move`] additionally rejects moves that leave the mover in check
//! - [`GameState::apply_move`] plays a safe move and updates the move-rights metadata
//!
//! All queries are total: empty source squares, same-colour targets and off-board
//! coordinates resolve to [`MoveKind::Illegal`].

pub use self::{apply::*, game_state::*};

mod apply;
mod game_state;
mod legality;
