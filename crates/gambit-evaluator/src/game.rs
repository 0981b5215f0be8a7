//! Self-play games between two move policies and their scoring.
//!
//! A game starts from the standard position with White to move and alternates
//! [`MovePolicy::select_move`] calls until one of:
//!
//! - the side to move has no check-safe move: checkmate if it is in check,
//!   stalemate otherwise
//! - `no_progress_limit` consecutive plies without a capture or pawn move (the
//!   limit itself ends the game)
//! - `max_plies` plies in total
//!
//! Each side accumulates a score from its own plies, see [`ScoringRules`].

use gambit_engine::{AppliedMove, Board, Color, GameState, PieceKind, Position, RejectedMoveError};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{MoveSelection, MovePolicy, PolicyError};

/// Score contributions of a single game.
///
/// After every ply the mover is credited with:
///
/// - the value of the captured piece (pawn 1, knight 3, bishop 3, rook 5, queen 9)
/// - `promotion_bonus` when a pawn promotes
/// - `center_bonus` for each of its pieces on d4, e4, d5 or e5
/// - `extended_center_bonus` for each of its pieces on the ring around them (c3 to f6)
///
/// Checkmate adds `win_bonus` to the winner and subtracts it from the loser;
/// stalemate subtracts `draw_penalty` from both sides.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringRules {
    pub center_bonus: f32,
    pub extended_center_bonus: f32,
    pub promotion_bonus: f32,
    pub win_bonus: f32,
    pub draw_penalty: f32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            center_bonus: 0.02,
            extended_center_bonus: 0.01,
            promotion_bonus: f32::from(PieceKind::Queen.value() - PieceKind::Pawn.value()),
            win_bonus: 50.0,
            draw_penalty: 5.0,
        }
    }
}

impl ScoringRules {
    #[must_use]
    pub fn capture_value(kind: PieceKind) -> f32 {
        f32::from(kind.value())
    }

    /// Positional bonus of `color` on `board`.
    #[must_use]
    pub fn positional_bonus(&self, board: &Board, color: Color) -> f32 {
        board
            .pieces()
            .filter(|(_, _, c)| *c == color)
            .map(|(pos, _, _)| match center_ring(pos) {
                Some(0) => self.center_bonus,
                Some(1) => self.extended_center_bonus,
                _ => 0.0,
            })
            .sum()
    }

    /// Score earned by the side that just played `applied`, leaving `board`.
    #[must_use]
    pub fn ply_score(&self, applied: &AppliedMove, board: &Board) -> f32 {
        let capture = applied.captured.map_or(0.0, Self::capture_value);
        let promotion = if applied.promotion.is_some() {
            self.promotion_bonus
        } else {
            0.0
        };
        capture + promotion + self.positional_bonus(board, applied.color)
    }
}

/// Ring distance from the four central squares: 0 for d4-e5, 1 for c3-f6.
fn center_ring(pos: Position) -> Option<u8> {
    let dist = |v: u8| if v < 4 { 3 - v } else { v - 4 };
    match dist(pos.x()).max(dist(pos.y())) {
        ring @ (0 | 1) => Some(ring),
        _ => None,
    }
}

/// Limits and scoring of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Hard cap on plies played.
    pub max_plies: usize,
    /// The game ends on the ply that brings the count of consecutive plies without a
    /// capture or pawn move up to this limit.
    pub no_progress_limit: usize,
    /// Divide both final scores by the number of plies played.
    pub normalize: bool,
    pub scoring: ScoringRules,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_plies: 300,
            no_progress_limit: 50,
            normalize: false,
            scoring: ScoringRules::default(),
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::Display)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Termination {
    #[display("checkmate, {} wins", winner.as_str())]
    Checkmate { winner: Color },
    #[display("stalemate, {} cannot move", stalemated.as_str())]
    Stalemate { stalemated: Color },
    #[display("no progress")]
    NoProgress,
    #[display("ply limit")]
    PlyLimit,
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    scores: [f32; 2],
    plies: usize,
    termination: Termination,
    state: GameState,
}

impl MatchOutcome {
    #[must_use]
    pub fn score(&self, color: Color) -> f32 {
        self.scores[color.index()]
    }

    /// Score of `color` minus the score of its opponent.
    #[must_use]
    pub fn differential(&self, color: Color) -> f32 {
        self.score(color) - self.score(color.opponent())
    }

    #[must_use]
    pub fn plies(&self) -> usize {
        self.plies
    }

    #[must_use]
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Position at the end of the game.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }
}

/// One ply of a game, as reported to [`MatchPlay::run`] observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlyRecord {
    /// 1-based ply number.
    pub ply: usize,
    pub applied: AppliedMove,
    /// Score the mover earned with this ply.
    pub score: f32,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum MatchError {
    #[display("move selection failed")]
    Policy { source: PolicyError },
    #[display("policy chose a move the rules rejected")]
    Rejected { source: RejectedMoveError },
}

/// A game ready to be played.
#[derive(Debug, Clone, Copy)]
pub struct MatchPlay<'a> {
    config: &'a MatchConfig,
    selection: MoveSelection,
    state: GameState,
    to_move: Color,
}

impl<'a> MatchPlay<'a> {
    /// A game from the standard initial position, White to move.
    #[must_use]
    pub fn new(config: &'a MatchConfig, selection: MoveSelection) -> Self {
        Self {
            config,
            selection,
            state: GameState::new(),
            to_move: Color::White,
        }
    }

    /// Starts from `state` with `to_move` playing first instead.
    #[must_use]
    pub fn starting_at(mut self, state: GameState, to_move: Color) -> Self {
        self.state = state;
        self.to_move = to_move;
        self
    }

    /// Plays the game to its end, calling `on_ply` after every move.
    pub fn run<R, F>(
        self,
        white: &mut MovePolicy,
        black: &mut MovePolicy,
        rng: &mut R,
        mut on_ply: F,
    ) -> Result<MatchOutcome, MatchError>
    where
        R: Rng + ?Sized,
        F: FnMut(&PlyRecord, &GameState),
    {
        let Self {
            config,
            selection,
            mut state,
            mut to_move,
        } = self;
        let rules = &config.scoring;
        let mut scores = [0.0_f32; 2];
        let mut plies = 0;
        let mut quiet_plies = 0;

        let termination = loop {
            if plies >= config.max_plies {
                break Termination::PlyLimit;
            }
            let policy = match to_move {
                Color::White => &mut *white,
                Color::Black => &mut *black,
            };
            let Some(mv) = policy.select_move(&state, to_move, selection, rng)? else {
                if state.is_check(to_move) {
                    scores[to_move.opponent().index()] += rules.win_bonus;
                    scores[to_move.index()] -= rules.win_bonus;
                    break Termination::Checkmate {
                        winner: to_move.opponent(),
                    };
                }
                for score in &mut scores {
                    *score -= rules.draw_penalty;
                }
                break Termination::Stalemate {
                    stalemated: to_move,
                };
            };

            let applied = state.apply_move(mv)?;
            let score = rules.ply_score(&applied, state.board());
            scores[to_move.index()] += score;
            plies += 1;
            if applied.captured.is_some() || applied.piece == PieceKind::Pawn {
                quiet_plies = 0;
            } else {
                quiet_plies += 1;
            }
            on_ply(
                &PlyRecord {
                    ply: plies,
                    applied,
                    score,
                },
                &state,
            );

            if quiet_plies >= config.no_progress_limit {
                break Termination::NoProgress;
            }
            to_move = to_move.opponent();
        };

        if config.normalize && plies > 0 {
            #[expect(clippy::cast_precision_loss)]
            let plies = plies as f32;
            for score in &mut scores {
                *score /= plies;
            }
        }

        Ok(MatchOutcome {
            scores,
            plies,
            termination,
            state,
        })
    }
}

/// Plays one game from the initial position, `white` moving first.
pub fn play_match<R>(
    white: &mut MovePolicy,
    black: &mut MovePolicy,
    selection: MoveSelection,
    config: &MatchConfig,
    rng: &mut R,
) -> Result<MatchOutcome, MatchError>
where
    R: Rng + ?Sized,
{
    MatchPlay::new(config, selection).run(white, black, rng, |_, _| {})
}
