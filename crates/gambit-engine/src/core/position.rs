use std::fmt;

use serde::{Deserialize, Serialize};

/// Board coordinate.
///
/// `x` is the file (0 = a, 7 = h) and `y` is the row (0 = rank 8, 7 = rank 1), so
/// row 0 is Black's back rank. A `Position` is always on the board; raw integer
/// coordinates go through [`Position::new`] or [`Position::offset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Position {
    x: u8,
    y: u8,
}

impl Position {
    pub const COUNT: usize = 64;

    #[must_use]
    pub const fn new(x: u8, y: u8) -> Option<Self> {
        if x < 8 && y < 8 {
            Some(Self { x, y })
        } else {
            None
        }
    }

    /// Position from a square index `y * 8 + x`.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self {
                x: (index % 8) as u8,
                y: (index / 8) as u8,
            })
        } else {
            None
        }
    }

    /// Parses algebraic coordinates such as `e4`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        let file = u8::try_from(file).ok()?;
        let rank = u8::try_from(rank).ok()?;
        Self::new(file - b'a', b'8' - rank)
    }

    #[must_use]
    pub const fn x(self) -> u8 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> u8 {
        self.y
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.y as usize * 8 + self.x as usize
    }

    /// Shifts the position, returning `None` when it leaves the board.
    #[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    #[must_use]
    pub const fn offset(self, dx: i8, dy: i8) -> Option<Self> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;
        if x < 0 || y < 0 {
            return None;
        }
        Self::new(x as u8, y as u8)
    }

    /// Signed file and row difference `other - self`.
    #[expect(clippy::cast_possible_wrap)]
    #[must_use]
    pub const fn delta(self, other: Self) -> (i8, i8) {
        (
            other.x as i8 - self.x as i8,
            other.y as i8 - self.y as i8,
        )
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.x);
        let rank = char::from(b'8' - self.y);
        write!(f, "{file}{rank}")
    }
}

/// A source/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Move {
    pub src: Position,
    pub dst: Position,
}

impl Move {
    /// Number of distinct source/destination pairs, including `src == dst`.
    pub const INDEX_COUNT: usize = Position::COUNT * Position::COUNT;

    #[must_use]
    pub const fn new(src: Position, dst: Position) -> Self {
        Self { src, dst }
    }

    /// Builds a move from raw coordinates, `None` if any of them is off the board.
    #[must_use]
    pub const fn from_coords(ax: u8, ay: u8, bx: u8, by: u8) -> Option<Self> {
        match (Position::new(ax, ay), Position::new(bx, by)) {
            (Some(src), Some(dst)) => Some(Self { src, dst }),
            _ => None,
        }
    }

    /// Decodes the linear index `src_index * 64 + dst_index`.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index >= Self::INDEX_COUNT {
            return None;
        }
        match (
            Position::from_index(index / Position::COUNT),
            Position::from_index(index % Position::COUNT),
        ) {
            (Some(src), Some(dst)) => Some(Self { src, dst }),
            _ => None,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.src.index() * Position::COUNT + self.dst.index()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.src, self.dst)
    }
}
