use crate::core::{Board, Color, Move, PieceKind, Position, Square};

/// Result of a legality query.
///
/// [`GameState::legal_move`] only yields `Illegal`, `Legal`, `Capture`,
/// `CaptureEnPassant` or `Castle`. [`GameState::safe_move`] additionally yields
/// `Unsafe` for moves that would leave the mover's king in check or next to the
/// enemy king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum MoveKind {
    #[display("illegal")]
    Illegal,
    #[display("legal")]
    Legal,
    #[display("capture")]
    Capture,
    #[display("en passant capture")]
    CaptureEnPassant,
    #[display("castle")]
    Castle,
    #[display("unsafe")]
    Unsafe,
}

impl MoveKind {
    /// Whether the move may actually be played.
    #[must_use]
    pub const fn is_playable(self) -> bool {
        !matches!(self, Self::Illegal | Self::Unsafe)
    }
}

/// En-passant target left by a pawn double-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnPassant {
    /// File the double-stepping pawn moved on.
    pub file: u8,
    /// Colour of the pawn that double-stepped.
    pub color: Color,
}

/// Move-rights metadata carried alongside the board.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameMeta {
    castling: [bool; 2],
    en_passant: Option<EnPassant>,
}

impl GameMeta {
    /// Metadata of the initial position: both colours may castle, no en-passant target.
    pub const INITIAL: Self = Self {
        castling: [true; 2],
        en_passant: None,
    };

    #[must_use]
    pub const fn castling_right(&self, color: Color) -> bool {
        self.castling[color.index()]
    }

    pub fn set_castling_right(&mut self, color: Color, allowed: bool) {
        self.castling[color.index()] = allowed;
    }

    #[must_use]
    pub const fn en_passant(&self) -> Option<EnPassant> {
        self.en_passant
    }

    pub fn set_en_passant(&mut self, en_passant: Option<EnPassant>) {
        self.en_passant = en_passant;
    }
}

/// Board plus metadata: everything needed to decide legality of a move.
///
/// A `GameState` is a small `Copy` value. Each simulated game owns its own state;
/// the check-safety test copies it, plays the move on the copy and discards it.
///
/// The state does not track whose turn it is; the caller alternates colours.
///
/// # Example
///
/// ```
/// use gambit_engine::{GameState, Move, MoveKind, Position};
///
/// let mut state = GameState::new();
/// let e2e4 = Move::new(Position::parse("e2").unwrap(), Position::parse("e4").unwrap());
/// assert_eq!(state.safe_move(e2e4), MoveKind::Legal);
/// state.apply_move(e2e4).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) meta: GameMeta,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Standard initial position with full castling rights.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            board: Board::INITIAL,
            meta: GameMeta::INITIAL,
        }
    }

    #[must_use]
    pub const fn from_parts(board: Board, meta: GameMeta) -> Self {
        Self { board, meta }
    }

    /// Builds a position from a piece list. Castling rights start cleared.
    pub fn from_pieces<I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = (Position, PieceKind, Color)>,
    {
        let mut board = Board::EMPTY;
        for (pos, kind, color) in pieces {
            board.set(pos, Square::new(kind, color));
        }
        Self {
            board,
            meta: GameMeta::default(),
        }
    }

    #[must_use]
    pub fn with_castling_right(mut self, color: Color, allowed: bool) -> Self {
        self.meta.set_castling_right(color, allowed);
        self
    }

    #[must_use]
    pub fn with_en_passant(mut self, en_passant: Option<EnPassant>) -> Self {
        self.meta.set_en_passant(en_passant);
        self
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub const fn meta(&self) -> &GameMeta {
        &self.meta
    }

    /// Legality check from raw coordinates; off-board coordinates are illegal.
    #[must_use]
    pub fn legal_move_at(&self, ax: u8, ay: u8, bx: u8, by: u8) -> MoveKind {
        Move::from_coords(ax, ay, bx, by).map_or(MoveKind::Illegal, |mv| self.legal_move(mv))
    }

    /// Check-safe legality from raw coordinates; off-board coordinates are illegal.
    #[must_use]
    pub fn safe_move_at(&self, ax: u8, ay: u8, bx: u8, by: u8) -> MoveKind {
        Move::from_coords(ax, ay, bx, by).map_or(MoveKind::Illegal, |mv| self.safe_move(mv))
    }
}
