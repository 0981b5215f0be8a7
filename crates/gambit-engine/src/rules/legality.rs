use crate::core::{Color, Move, PieceKind, Position, Square};

use super::{
    apply::place_piece,
    game_state::{GameState, MoveKind},
};

const KING_FILE: u8 = 4;

impl GameState {
    /// Decides whether `mv` follows the movement rules of the piece on its source square.
    ///
    /// Check safety of the mover's own king is not considered here, except for the
    /// castling transit squares. See [`Self::safe_move`].
    #[must_use]
    pub fn legal_move(&self, mv: Move) -> MoveKind {
        let Move { src, dst } = mv;
        if src == dst {
            return MoveKind::Illegal;
        }
        let Some((kind, color)) = self.board.get(src).piece() else {
            return MoveKind::Illegal;
        };
        let target = self.board.get(dst);
        if target.is_color(color) {
            return MoveKind::Illegal;
        }

        let result = match kind {
            PieceKind::Pawn => self.pawn_move(src, dst, color),
            PieceKind::Bishop => self.slide(src, dst, true, false),
            PieceKind::Knight => knight_jump(src, dst),
            PieceKind::Rook => self.slide(src, dst, false, true),
            PieceKind::Queen => self.slide(src, dst, true, true),
            PieceKind::King => self.king_move(src, dst, color),
        };

        if result == MoveKind::Legal && !target.is_empty() {
            MoveKind::Capture
        } else {
            result
        }
    }

    /// Whether any non-king piece of the opponent can legally move onto `color`'s king.
    ///
    /// Returns `false` when `color` has no king on the board.
    #[must_use]
    pub fn is_check(&self, color: Color) -> bool {
        let Some(king) = self.board.king(color) else {
            return false;
        };
        self.board.pieces().any(|(pos, kind, piece_color)| {
            piece_color != color
                && kind != PieceKind::King
                && !self.legal_move(Move::new(pos, king)).is_illegal()
        })
    }

    /// Like [`Self::legal_move`], but returns [`MoveKind::Unsafe`] when the move would
    /// leave the mover's own king in check or next to the enemy king.
    #[must_use]
    pub fn safe_move(&self, mv: Move) -> MoveKind {
        let result = self.legal_move(mv);
        if !result.is_playable() {
            return result;
        }
        let Some(color) = self.board.get(mv.src).color() else {
            return MoveKind::Illegal;
        };
        let mut scratch = *self;
        place_piece(&mut scratch.board, mv, result);
        if scratch.kings_adjacent() || (!result.is_castle() && scratch.is_check(color)) {
            MoveKind::Unsafe
        } else {
            result
        }
    }

    /// Whether the two kings stand on neighbouring squares. [`Self::is_check`] does not
    /// see attacks by a king.
    fn kings_adjacent(&self) -> bool {
        let (Some(white), Some(black)) = (
            self.board.king(Color::White),
            self.board.king(Color::Black),
        ) else {
            return false;
        };
        let (dx, dy) = white.delta(black);
        dx.abs() <= 1 && dy.abs() <= 1
    }

    fn pawn_move(&self, src: Position, dst: Position, color: Color) -> MoveKind {
        let dir = color.pawn_direction();
        let (dx, dy) = src.delta(dst);
        let target = self.board.get(dst);

        match (dx.abs(), dy) {
            (0, dy) if dy == dir => {
                if target.is_empty() {
                    MoveKind::Legal
                } else {
                    MoveKind::Illegal
                }
            }
            (0, dy) if dy == 2 * dir => {
                let through_empty = src
                    .offset(0, dir)
                    .is_some_and(|mid| self.board.get(mid).is_empty());
                if src.y() == color.pawn_row() && through_empty && target.is_empty() {
                    MoveKind::Legal
                } else {
                    MoveKind::Illegal
                }
            }
            (1, dy) if dy == dir => {
                if !target.is_empty() {
                    MoveKind::Legal
                } else if self.is_en_passant(src, dst, color) {
                    MoveKind::CaptureEnPassant
                } else {
                    MoveKind::Illegal
                }
            }
            _ => MoveKind::Illegal,
        }
    }

    fn is_en_passant(&self, src: Position, dst: Position, color: Color) -> bool {
        let Some(ep) = self.meta.en_passant() else {
            return false;
        };
        if ep.file != dst.x() || ep.color == color || src.y() != color.en_passant_row() {
            return false;
        }
        Position::new(dst.x(), src.y())
            .is_some_and(|pos| self.board.get(pos).is(PieceKind::Pawn, ep.color))
    }

    fn slide(&self, src: Position, dst: Position, diagonal: bool, orthogonal: bool) -> MoveKind {
        let (dx, dy) = src.delta(dst);
        let on_line = (orthogonal && (dx == 0 || dy == 0)) || (diagonal && dx.abs() == dy.abs());
        if !on_line {
            return MoveKind::Illegal;
        }

        let (sx, sy) = (dx.signum(), dy.signum());
        let mut cursor = src;
        loop {
            let Some(next) = cursor.offset(sx, sy) else {
                return MoveKind::Illegal;
            };
            if next == dst {
                return MoveKind::Legal;
            }
            if !self.board.get(next).is_empty() {
                return MoveKind::Illegal;
            }
            cursor = next;
        }
    }

    fn king_move(&self, src: Position, dst: Position, color: Color) -> MoveKind {
        let (dx, dy) = src.delta(dst);
        if dx.abs() <= 1 && dy.abs() <= 1 {
            return MoveKind::Legal;
        }
        if dy == 0 && dx.abs() == 2 {
            return self.castle(src, dx.signum(), color);
        }
        MoveKind::Illegal
    }

    fn castle(&self, src: Position, step: i8, color: Color) -> MoveKind {
        if !self.meta.castling_right(color) || src.x() != KING_FILE || src.y() != color.back_row() {
            return MoveKind::Illegal;
        }

        let rook_file = if step > 0 { 7 } else { 0 };
        let Some(rook) = Position::new(rook_file, color.back_row()) else {
            return MoveKind::Illegal;
        };
        if self.board.get(rook) != Square::new(PieceKind::Rook, color) {
            return MoveKind::Illegal;
        }

        let mut cursor = src;
        while let Some(next) = cursor.offset(step, 0).filter(|next| *next != rook) {
            if !self.board.get(next).is_empty() {
                return MoveKind::Illegal;
            }
            cursor = next;
        }

        if self.is_check(color) {
            return MoveKind::Illegal;
        }

        // walk the king one square at a time, testing check on each
        let mut scratch = *self;
        let mut from = src;
        for _ in 0..2 {
            let Some(to) = from.offset(step, 0) else {
                return MoveKind::Illegal;
            };
            let king = scratch.board.take(from);
            scratch.board.set(to, king);
            if scratch.is_check(color) {
                return MoveKind::Illegal;
            }
            from = to;
        }

        MoveKind::Castle
    }
}

fn knight_jump(src: Position, dst: Position) -> MoveKind {
    let (dx, dy) = src.delta(dst);
    match (dx.abs(), dy.abs()) {
        (1, 2) | (2, 1) => MoveKind::Legal,
        _ => MoveKind::Illegal,
    }
}
