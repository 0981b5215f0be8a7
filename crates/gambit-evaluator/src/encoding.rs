//! Board encoding and move indexing shared by every chess brain.
//!
//! The input vector has one plane of 64 squares per (colour, piece kind) pair:
//!
//! ```text
//! index = (color * 6 + kind_index) * 64 + square_index
//! ```
//!
//! where `color` is 0 for Black and 1 for White, `kind_index` runs pawn, bishop,
//! knight, rook, queen, king and `square_index = y * 8 + x`. Occupied squares set
//! their entry to 1, everything else is 0.
//!
//! The output vector holds one score per move index `src_index * 64 + dst_index`
//! (see [`Move::index`]).

use gambit_engine::{Board, Color, Move, PieceKind, Position};

/// Number of (colour, piece kind) planes.
pub const PLANE_COUNT: usize = 2 * PieceKind::LEN;

/// Length of an encoded board.
pub const INPUT_SIZE: usize = PLANE_COUNT * Position::COUNT;

/// Number of move scores a chess brain produces.
pub const OUTPUT_SIZE: usize = Move::INDEX_COUNT;

/// Input index of a `kind`/`color` piece standing on `pos`.
#[must_use]
pub const fn feature_index(pos: Position, kind: PieceKind, color: Color) -> usize {
    (color.index() * PieceKind::LEN + kind.index()) * Position::COUNT + pos.index()
}

/// Writes the one-hot encoding of `board` into `input`.
///
/// # Panics
///
/// Panics if `input.len() != INPUT_SIZE`.
pub fn encode_board_into(board: &Board, input: &mut [f32]) {
    assert_eq!(input.len(), INPUT_SIZE);
    input.fill(0.0);
    for (pos, kind, color) in board.pieces() {
        input[feature_index(pos, kind, color)] = 1.0;
    }
}

/// One-hot encoding of `board` as a fresh vector.
#[must_use]
pub fn encode_board(board: &Board) -> Vec<f32> {
    let mut input = vec![0.0; INPUT_SIZE];
    encode_board_into(board, &mut input);
    input
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(INPUT_SIZE, 768);
        assert_eq!(OUTPUT_SIZE, 4096);
    }

    #[test]
    fn test_feature_indices_are_distinct() {
        let mut seen = HashSet::new();
        for color in Color::ALL {
            for kind in PieceKind::ALL {
                for pos in Position::all() {
                    let index = feature_index(pos, kind, color);
                    assert!(index < INPUT_SIZE);
                    assert!(seen.insert(index));
                }
            }
        }
        assert_eq!(seen.len(), INPUT_SIZE);
    }

    #[test]
    fn test_initial_board_encoding() {
        let input = encode_board(&Board::INITIAL);
        assert_eq!(input.iter().filter(|v| **v == 1.0).count(), 32);
        assert_eq!(input.iter().filter(|v| **v == 0.0).count(), INPUT_SIZE - 32);

        let e1 = Position::parse("e1").unwrap();
        assert_eq!(input[feature_index(e1, PieceKind::King, Color::White)], 1.0);
        assert_eq!(input[feature_index(e1, PieceKind::King, Color::Black)], 0.0);
        // white king plane is the last one
        assert_eq!(feature_index(e1, PieceKind::King, Color::White), 11 * 64 + 7 * 8 + 4);
    }

    #[test]
    fn test_encoding_is_deterministic_and_overwrites() {
        let mut input = vec![0.5; INPUT_SIZE];
        encode_board_into(&Board::EMPTY, &mut input);
        assert!(input.iter().all(|v| *v == 0.0));
        assert_eq!(encode_board(&Board::INITIAL), encode_board(&Board::INITIAL));
    }
}
