use serde::{Deserialize, Serialize};

/// Side of a piece.
///
/// The discriminants match the colour bit packed into a [`Square`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    White = 1,
}

impl Color {
    pub const ALL: [Self; 2] = [Self::Black, Self::White];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row delta of a pawn step for this colour.
    #[must_use]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Self::Black => 1,
            Self::White => -1,
        }
    }

    /// Row holding this colour's king and rooks in the initial position.
    #[must_use]
    pub const fn back_row(self) -> u8 {
        match self {
            Self::Black => 0,
            Self::White => 7,
        }
    }

    /// Row this colour's pawns start on.
    #[must_use]
    pub const fn pawn_row(self) -> u8 {
        match self {
            Self::Black => 1,
            Self::White => 6,
        }
    }

    /// Row a pawn of this colour must stand on to capture en passant.
    #[must_use]
    pub const fn en_passant_row(self) -> u8 {
        match self {
            Self::Black => 4,
            Self::White => 3,
        }
    }

    /// Row on which a pawn of this colour promotes.
    #[must_use]
    pub const fn promotion_row(self) -> u8 {
        self.opponent().back_row()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

/// Kind of a chess piece.
///
/// The discriminants are the 3-bit tags packed into a [`Square`]; tag 0 is reserved
/// for the empty square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    Pawn = 1,
    Bishop = 2,
    Knight = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceKind {
    pub const LEN: usize = 6;

    pub const ALL: [Self; Self::LEN] = [
        Self::Pawn,
        Self::Bishop,
        Self::Knight,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];

    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        let kind = match tag {
            1 => Self::Pawn,
            2 => Self::Bishop,
            3 => Self::Knight,
            4 => Self::Rook,
            5 => Self::Queen,
            6 => Self::King,
            _ => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Zero-based index in `0..6`, in tag order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    /// Material value used for capture scoring.
    ///
    /// Safe moves never leave a king where it can be taken, so it is worth nothing.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Pawn => 1,
            Self::Bishop | Self::Knight => 3,
            Self::Rook => 5,
            Self::Queen => 9,
            Self::King => 0,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Bishop => "bishop",
            Self::Knight => "knight",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    /// Upper-case letter for the piece, as used in algebraic notation.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Bishop => 'B',
            Self::Knight => 'N',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }
}

/// Raw square value with a piece tag outside the known kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid square value {raw:#04x}")]
pub struct InvalidSquareError {
    pub raw: u8,
}

/// One cell of the board: empty, or a piece kind and colour packed into a byte.
///
/// Bits 0–2 hold the [`PieceKind`] tag, bit 3 holds the [`Color`]. The raw value 0
/// is the empty square.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square(u8);

impl Square {
    pub const EMPTY: Self = Self(0);

    const KIND_MASK: u8 = 0x07;
    const COLOR_SHIFT: u8 = 3;

    #[must_use]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self(kind.tag() | ((color as u8) << Self::COLOR_SHIFT))
    }

    /// Rebuilds a square from its packed byte, rejecting unknown piece tags.
    pub const fn from_raw(raw: u8) -> Result<Self, InvalidSquareError> {
        if raw == 0 {
            return Ok(Self::EMPTY);
        }
        if raw >> (Self::COLOR_SHIFT + 1) != 0 || PieceKind::from_tag(raw & Self::KIND_MASK).is_none() {
            return Err(InvalidSquareError { raw });
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn kind(self) -> Option<PieceKind> {
        PieceKind::from_tag(self.0 & Self::KIND_MASK)
    }

    #[must_use]
    pub const fn color(self) -> Option<Color> {
        if self.is_empty() {
            return None;
        }
        if (self.0 >> Self::COLOR_SHIFT) & 1 == 1 {
            Some(Color::White)
        } else {
            Some(Color::Black)
        }
    }

    #[must_use]
    pub const fn piece(self) -> Option<(PieceKind, Color)> {
        match (self.kind(), self.color()) {
            (Some(kind), Some(color)) => Some((kind, color)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is(self, kind: PieceKind, color: Color) -> bool {
        self == Self::new(kind, color)
    }

    #[must_use]
    pub fn is_color(self, color: Color) -> bool {
        self.color() == Some(color)
    }

    /// Letter for board rendering: upper case for White, lower case for Black, `.` when empty.
    #[must_use]
    pub fn as_char(self) -> char {
        match self.piece() {
            None => '.',
            Some((kind, Color::White)) => kind.as_char(),
            Some((kind, Color::Black)) => kind.as_char().to_ascii_lowercase(),
        }
    }
}
