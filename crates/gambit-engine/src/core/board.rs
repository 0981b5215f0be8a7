use std::fmt;

use super::{
    position::Position,
    square::{Color, PieceKind, Square},
};

/// Fixed 8×8 grid of [`Square`]s, row-major, row 0 being Black's back rank.
///
/// The board does not enforce chess invariants such as one king per colour; callers
/// building custom positions are responsible for them.
///
/// # Example
///
/// ```
/// use gambit_engine::{Board, Color, PieceKind, Position, Square};
///
/// let board = Board::INITIAL;
/// let e1 = Position::parse("e1").unwrap();
/// assert_eq!(board[e1], Square::new(PieceKind::King, Color::White));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [[Square; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

const fn back_row(color: Color) -> [Square; 8] {
    use PieceKind::{Bishop, King, Knight, Queen, Rook};
    [
        Square::new(Rook, color),
        Square::new(Knight, color),
        Square::new(Bishop, color),
        Square::new(Queen, color),
        Square::new(King, color),
        Square::new(Bishop, color),
        Square::new(Knight, color),
        Square::new(Rook, color),
    ]
}

const fn pawn_row(color: Color) -> [Square; 8] {
    [Square::new(PieceKind::Pawn, color); 8]
}

impl Board {
    pub const EMPTY: Self = Self {
        rows: [[Square::EMPTY; 8]; 8],
    };

    pub const INITIAL: Self = {
        const E: [Square; 8] = [Square::EMPTY; 8];
        assert!(Color::Black.back_row() == 0 && Color::White.back_row() == 7);
        Self {
            rows: [
                back_row(Color::Black),
                pawn_row(Color::Black),
                E,
                E,
                E,
                E,
                pawn_row(Color::White),
                back_row(Color::White),
            ],
        }
    };

    #[must_use]
    pub fn get(&self, pos: Position) -> Square {
        self.rows[usize::from(pos.y())][usize::from(pos.x())]
    }

    pub fn set(&mut self, pos: Position, square: Square) {
        self.rows[usize::from(pos.y())][usize::from(pos.x())] = square;
    }

    /// Empties `pos`, returning what was there.
    pub fn take(&mut self, pos: Position) -> Square {
        std::mem::take(&mut self.rows[usize::from(pos.y())][usize::from(pos.x())])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Square; 8]> {
        self.rows.iter()
    }

    /// Iterates over occupied squares as `(position, kind, color)`.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, PieceKind, Color)> + '_ {
        Position::all().filter_map(|pos| {
            let (kind, color) = self.get(pos).piece()?;
            Some((pos, kind, color))
        })
    }

    /// Position of `color`'s king, the first one in row-major order if there are several.
    #[must_use]
    pub fn king(&self, color: Color) -> Option<Position> {
        let king = Square::new(PieceKind::King, color);
        Position::all().find(|pos| self.get(*pos) == king)
    }
}

impl std::ops::Index<Position> for Board {
    type Output = Square;

    fn index(&self, pos: Position) -> &Self::Output {
        &self.rows[usize::from(pos.y())][usize::from(pos.x())]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.rows.iter().enumerate() {
            write!(f, "{} ", 8 - y)?;
            for square in row {
                write!(f, " {}", square.as_char())?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in 'a'..='h' {
            write!(f, " {file}")?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_board_layout() {
        let board = Board::INITIAL;
        assert_eq!(board.pieces().count(), 32);
        for color in Color::ALL {
            assert_eq!(
                board.pieces().filter(|(_, _, c)| *c == color).count(),
                16,
                "{} should have 16 pieces",
                color.as_str()
            );
        }
        assert_eq!(board.king(Color::White), Position::parse("e1"));
        assert_eq!(board.king(Color::Black), Position::parse("e8"));
        assert_eq!(
            board[Position::parse("d8").unwrap()],
            Square::new(PieceKind::Queen, Color::Black)
        );
        assert_eq!(
            board[Position::parse("a2").unwrap()],
            Square::new(PieceKind::Pawn, Color::White)
        );
    }

    #[test]
    fn test_set_take() {
        let mut board = Board::EMPTY;
        let pos = Position::parse("c3").unwrap();
        let knight = Square::new(PieceKind::Knight, Color::White);
        board.set(pos, knight);
        assert_eq!(board.get(pos), knight);
        assert_eq!(board.take(pos), knight);
        assert!(board.get(pos).is_empty());
    }

    #[test]
    fn test_render() {
        let rendered = Board::INITIAL.to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[6], "2  P P P P P P P P");
        assert_eq!(lines[8], "   a b c d e f g h");
    }
}
