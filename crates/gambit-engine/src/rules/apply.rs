use crate::core::{Board, Color, Move, PieceKind, Position, Square};

use super::game_state::{EnPassant, GameState, MoveKind};

/// A move [`GameState::apply_move`] refused to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("move {mv} rejected: {kind}")]
pub struct RejectedMoveError {
    pub mv: Move,
    pub kind: MoveKind,
}

/// What happened on the board when a move was played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub mv: Move,
    pub kind: MoveKind,
    pub piece: PieceKind,
    pub color: Color,
    /// Kind of the captured piece, including en-passant captures.
    pub captured: Option<PieceKind>,
    /// Kind the moving pawn was promoted to.
    pub promotion: Option<PieceKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    pub(crate) captured: Option<PieceKind>,
    pub(crate) promotion: Option<PieceKind>,
}

/// Mutates `board` for a move already classified as `kind`.
///
/// Handles the rook hop of a castle, removal of the pawn taken en passant and
/// automatic queen promotion. Illegal and unsafe moves leave the board untouched.
pub(crate) fn place_piece(board: &mut Board, mv: Move, kind: MoveKind) -> Placement {
    let mut placement = Placement {
        captured: None,
        promotion: None,
    };
    if !kind.is_playable() {
        return placement;
    }

    let Move { src, dst } = mv;
    match kind {
        MoveKind::Castle => {
            let (dx, _) = src.delta(dst);
            let rook_file = if dx > 0 { 7 } else { 0 };
            if let (Some(rook_src), Some(rook_dst)) = (
                Position::new(rook_file, src.y()),
                src.offset(dx.signum(), 0),
            ) {
                let rook = board.take(rook_src);
                board.set(rook_dst, rook);
            }
        }
        MoveKind::CaptureEnPassant => {
            if let Some(taken) = Position::new(dst.x(), src.y()) {
                placement.captured = board.take(taken).kind();
            }
        }
        MoveKind::Capture => placement.captured = board.get(dst).kind(),
        MoveKind::Legal | MoveKind::Illegal | MoveKind::Unsafe => {}
    }

    let mut moving = board.take(src);
    if let Some((PieceKind::Pawn, color)) = moving.piece()
        && dst.y() == color.promotion_row()
    {
        moving = Square::new(PieceKind::Queen, color);
        placement.promotion = Some(PieceKind::Queen);
    }
    board.set(dst, moving);

    placement
}

impl GameState {
    /// Plays `mv` if it is check-safe.
    ///
    /// The metadata is updated before the board: the mover loses its castling right
    /// when its king moves, any previous en-passant target expires, and a pawn
    /// double-step leaves a new one. A rejected move changes nothing.
    pub fn apply_move(&mut self, mv: Move) -> Result<AppliedMove, RejectedMoveError> {
        let kind = self.safe_move(mv);
        let Some((piece, color)) = self.board.get(mv.src).piece().filter(|_| kind.is_playable())
        else {
            return Err(RejectedMoveError { mv, kind });
        };

        if piece == PieceKind::King {
            self.meta.set_castling_right(color, false);
        }
        let (_, dy) = mv.src.delta(mv.dst);
        let double_step = piece == PieceKind::Pawn && dy.abs() == 2;
        self.meta.set_en_passant(double_step.then_some(EnPassant {
            file: mv.src.x(),
            color,
        }));

        let Placement {
            captured,
            promotion,
        } = place_piece(&mut self.board, mv, kind);

        Ok(AppliedMove {
            mv,
            kind,
            piece,
            color,
            captured,
            promotion,
        })
    }

    /// Every check-safe move available to `color`, in move-index order.
    #[must_use]
    pub fn safe_moves(&self, color: Color) -> Vec<(Move, MoveKind)> {
        self.board
            .pieces()
            .filter(|(_, _, piece_color)| *piece_color == color)
            .flat_map(|(src, _, _)| Position::all().map(move |dst| Move::new(src, dst)))
            .map(|mv| (mv, self.safe_move(mv)))
            .filter(|(_, kind)| kind.is_playable())
            .collect()
    }

    /// Whether `color` has at least one check-safe move.
    #[must_use]
    pub fn has_safe_move(&self, color: Color) -> bool {
        self.board
            .pieces()
            .filter(|(_, _, piece_color)| *piece_color == color)
            .any(|(src, _, _)| {
                Position::all().any(|dst| self.safe_move(Move::new(src, dst)).is_playable())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Color::{Black, White};
    use PieceKind::{King, Knight, Pawn, Queen, Rook};

    fn pos(name: &str) -> Position {
        Position::parse(name).unwrap()
    }

    fn mv(src: &str, dst: &str) -> Move {
        Move::new(pos(src), pos(dst))
    }

    fn state(pieces: &[(&str, PieceKind, Color)]) -> GameState {
        GameState::from_pieces(pieces.iter().map(|(p, k, c)| (pos(p), *k, *c)))
    }

    #[test]
    fn test_initial_mobility() {
        let state = GameState::new();
        assert_eq!(state.safe_moves(White).len(), 20);
        assert_eq!(state.safe_moves(Black).len(), 20);
        assert!(state.has_safe_move(White));
    }

    #[test]
    fn test_double_step_sets_en_passant_for_one_ply() {
        let mut state = state(&[
            ("e1", King, White),
            ("e8", King, Black),
            ("e5", Pawn, White),
            ("d7", Pawn, Black),
            ("h2", Pawn, White),
        ]);

        state.apply_move(mv("d7", "d5")).unwrap();
        assert_eq!(
            state.meta().en_passant(),
            Some(EnPassant {
                file: 3,
                color: Black
            })
        );
        assert_eq!(state.safe_move(mv("e5", "d6")), MoveKind::CaptureEnPassant);

        // white lets the chance pass, then black moves
        let mut later = state;
        later.apply_move(mv("h2", "h3")).unwrap();
        assert_eq!(later.meta().en_passant(), None);
        later.apply_move(mv("e8", "f8")).unwrap();
        assert_eq!(later.safe_move(mv("e5", "d6")), MoveKind::Illegal);

        let applied = state.apply_move(mv("e5", "d6")).unwrap();
        assert_eq!(applied.kind, MoveKind::CaptureEnPassant);
        assert_eq!(applied.captured, Some(Pawn));
        assert!(state.board().get(pos("d5")).is_empty());
        assert!(state.board().get(pos("d6")).is(Pawn, White));
        assert_eq!(state.meta().en_passant(), None);
    }

    #[test]
    fn test_castle_relocates_rook_and_clears_rights() {
        let mut state = state(&[
            ("e1", King, White),
            ("h1", Rook, White),
            ("a1", Rook, White),
            ("e8", King, Black),
        ])
        .with_castling_right(White, true);

        let applied = state.apply_move(mv("e1", "g1")).unwrap();
        assert_eq!(applied.kind, MoveKind::Castle);
        assert!(state.board().get(pos("g1")).is(King, White));
        assert!(state.board().get(pos("f1")).is(Rook, White));
        assert!(state.board().get(pos("h1")).is_empty());
        assert!(state.board().get(pos("e1")).is_empty());
        assert!(!state.meta().castling_right(White));

        state.apply_move(mv("g1", "f2")).unwrap();
        state.apply_move(mv("f2", "e1")).unwrap();
        assert_eq!(state.legal_move(mv("e1", "c1")), MoveKind::Illegal);
    }

    #[test]
    fn test_queenside_castle() {
        let mut state = state(&[("e8", King, Black), ("a8", Rook, Black), ("e1", King, White)])
            .with_castling_right(Black, true);
        state.apply_move(mv("e8", "c8")).unwrap();
        assert!(state.board().get(pos("c8")).is(King, Black));
        assert!(state.board().get(pos("d8")).is(Rook, Black));
        assert!(state.board().get(pos("a8")).is_empty());
    }

    #[test]
    fn test_king_move_clears_castling_rights() {
        let mut state = GameState::new();
        state.apply_move(mv("e2", "e4")).unwrap();
        state.apply_move(mv("e7", "e5")).unwrap();
        state.apply_move(mv("e1", "e2")).unwrap();
        assert!(!state.meta().castling_right(White));
        assert!(state.meta().castling_right(Black));
    }

    #[test]
    fn test_promotion_to_queen() {
        let mut state = state(&[
            ("b7", Pawn, White),
            ("a8", Knight, Black),
            ("h1", King, White),
            ("h5", King, Black),
            ("c2", Pawn, Black),
        ]);
        let applied = state.apply_move(mv("b7", "a8")).unwrap();
        assert_eq!(applied.kind, MoveKind::Capture);
        assert_eq!(applied.captured, Some(Knight));
        assert_eq!(applied.promotion, Some(Queen));
        assert!(state.board().get(pos("a8")).is(Queen, White));

        let applied = state.apply_move(mv("c2", "c1")).unwrap();
        assert_eq!(applied.promotion, Some(Queen));
        assert!(state.board().get(pos("c1")).is(Queen, Black));
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut state = state(&[
            ("e1", King, White),
            ("e2", Rook, White),
            ("e8", Rook, Black),
            ("a8", King, Black),
        ]);
        let before = state;
        let err = state.apply_move(mv("e2", "d2")).unwrap_err();
        assert_eq!(err.kind, MoveKind::Unsafe);
        assert_eq!(state, before);

        let err = state.apply_move(mv("e2", "d3")).unwrap_err();
        assert_eq!(err.kind, MoveKind::Illegal);
        assert_eq!(state, before);

        let err = state.apply_move(mv("c4", "c5")).unwrap_err();
        assert_eq!(err.kind, MoveKind::Illegal);
        assert_eq!(err.to_string(), "move c4c5 rejected: illegal");
    }

    #[test]
    fn test_checkmate_has_no_safe_move() {
        // back-rank mate
        let state = state(&[
            ("g8", King, Black),
            ("f7", Pawn, Black),
            ("g7", Pawn, Black),
            ("h7", Pawn, Black),
            ("a8", Rook, White),
            ("g1", King, White),
        ]);
        assert!(state.is_check(Black));
        assert!(!state.has_safe_move(Black));
        assert!(state.safe_moves(Black).is_empty());
    }

    #[test]
    fn test_stalemate_has_no_safe_move() {
        let state = state(&[("a8", King, Black), ("b6", Queen, White), ("h1", King, White)]);
        assert!(!state.is_check(Black));
        assert!(!state.has_safe_move(Black));
    }
}
