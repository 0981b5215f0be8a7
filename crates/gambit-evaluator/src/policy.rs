use gambit_brain::{Activation, Brain, BrainError, LayerSpec, softmax};
use gambit_engine::{Color, GameState, Move, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::encoding::{INPUT_SIZE, OUTPUT_SIZE, encode_board_into};

/// How a move is picked from the masked scores.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize, derive_more::IsVariant)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoveSelection {
    /// Draw from the temperature-scaled softmax of the masked scores.
    Sample { temperature: f32 },
    /// Take the highest masked score; ties go to the lowest move index.
    Greedy,
}

impl MoveSelection {
    fn validate(self) -> Result<(), PolicyError> {
        if let Self::Sample { temperature } = self
            && !(temperature.is_finite() && temperature > 0.0)
        {
            return Err(PolicyError::InvalidTemperature { temperature });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum PolicyError {
    #[display(
        "brain maps {input_size} inputs to {output_size} outputs, expected {} to {}",
        INPUT_SIZE,
        OUTPUT_SIZE
    )]
    IncompatibleBrain {
        input_size: usize,
        output_size: usize,
    },
    #[display("sampling temperature must be finite and positive, got {temperature}")]
    InvalidTemperature { temperature: f32 },
}

/// Hidden-layer widths of the default chess brain.
pub const DEFAULT_HIDDEN_LAYERS: [usize; 2] = [1024, 512];

/// Randomly initialised chess brain: `768 -> hidden (ReLU) ... -> 4096 (identity)`.
pub fn new_chess_brain<R>(hidden_layers: &[usize], rng: &mut R) -> Result<Brain, BrainError>
where
    R: Rng + ?Sized,
{
    let specs = hidden_layers
        .iter()
        .map(|&width| LayerSpec::new(width, Activation::Relu))
        .chain([LayerSpec::new(OUTPUT_SIZE, Activation::Identity)])
        .collect::<Vec<_>>();
    Brain::random(INPUT_SIZE, &specs, rng)
}

/// Checks that `brain` maps an encoded board to one score per move index.
pub fn check_chess_brain(brain: &Brain) -> Result<(), PolicyError> {
    if brain.input_size() != INPUT_SIZE || brain.output_size() != OUTPUT_SIZE {
        return Err(PolicyError::IncompatibleBrain {
            input_size: brain.input_size(),
            output_size: brain.output_size(),
        });
    }
    Ok(())
}

/// A brain playing chess, with its reusable input and score buffers.
///
/// Each game-playing thread owns its policies; the brain inside is only read by
/// move selection, apart from its forward-pass buffers.
#[derive(Debug, Clone)]
pub struct MovePolicy {
    brain: Brain,
    input: Vec<f32>,
    scores: Vec<f32>,
}

impl MovePolicy {
    pub fn new(brain: Brain) -> Result<Self, PolicyError> {
        check_chess_brain(&brain)?;
        Ok(Self {
            brain,
            input: vec![0.0; INPUT_SIZE],
            scores: vec![0.0; OUTPUT_SIZE],
        })
    }

    #[must_use]
    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    #[must_use]
    pub fn into_brain(self) -> Brain {
        self.brain
    }

    /// Picks a check-safe move for `color`, or `None` if it has none.
    ///
    /// The brain scores all 4096 move indices. Indices whose source square does not
    /// hold a `color` piece, or whose move is illegal or unsafe, are excluded; the
    /// move is then chosen among the rest according to `selection`.
    pub fn select_move<R>(
        &mut self,
        state: &GameState,
        color: Color,
        selection: MoveSelection,
        rng: &mut R,
    ) -> Result<Option<Move>, PolicyError>
    where
        R: Rng + ?Sized,
    {
        choose_move(
            &mut self.brain,
            &mut self.input,
            &mut self.scores,
            state,
            color,
            selection,
            rng,
        )
    }
}

/// Picks a move for `color` with `brain`; see [`MovePolicy::select_move`].
///
/// Allocates fresh buffers on each call. Game loops keep a [`MovePolicy`] instead.
pub fn select_move<R>(
    state: &GameState,
    brain: &mut Brain,
    color: Color,
    selection: MoveSelection,
    rng: &mut R,
) -> Result<Option<Move>, PolicyError>
where
    R: Rng + ?Sized,
{
    check_chess_brain(brain)?;
    let mut input = vec![0.0; INPUT_SIZE];
    let mut scores = vec![0.0; OUTPUT_SIZE];
    choose_move(brain, &mut input, &mut scores, state, color, selection, rng)
}

fn choose_move<R>(
    brain: &mut Brain,
    input: &mut [f32],
    scores: &mut [f32],
    state: &GameState,
    color: Color,
    selection: MoveSelection,
    rng: &mut R,
) -> Result<Option<Move>, PolicyError>
where
    R: Rng + ?Sized,
{
    selection.validate()?;
    encode_board_into(state.board(), input);
    scores.copy_from_slice(brain.forward(input));

    if !mask_unplayable(state, color, scores) {
        return Ok(None);
    }

    let index = match selection {
        MoveSelection::Greedy => argmax(scores),
        MoveSelection::Sample { temperature } => {
            softmax(scores, temperature);
            sample_index(scores, rng.random())
        }
    };
    Ok(index.and_then(Move::from_index))
}

/// Replaces unplayable scores with negative infinity.
///
/// Returns whether any playable move remains.
fn mask_unplayable(state: &GameState, color: Color, scores: &mut [f32]) -> bool {
    let mut any_playable = false;
    for (src, chunk) in Position::all().zip(scores.chunks_exact_mut(Position::COUNT)) {
        if !state.board().get(src).is_color(color) {
            chunk.fill(f32::NEG_INFINITY);
            continue;
        }
        for (dst, score) in Position::all().zip(chunk) {
            if state.safe_move(Move::new(src, dst)).is_playable() {
                any_playable = true;
                // keep playable scores finite so they stay comparable
                *score = if score.is_nan() {
                    f32::MIN
                } else {
                    score.clamp(f32::MIN, f32::MAX)
                };
            } else {
                *score = f32::NEG_INFINITY;
            }
        }
    }
    any_playable
}

/// Index of the highest finite score, lowest index on ties.
fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score == f32::NEG_INFINITY {
            continue;
        }
        if best.is_none_or(|(_, b)| score > b) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Inverse-CDF draw: the first index whose cumulative weight exceeds `target`.
///
/// Falls back to the last positive weight when rounding keeps the total below
/// `target`.
fn sample_index(weights: &[f32], target: f32) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        last = Some(i);
        cumulative += w;
        if target < cumulative {
            break;
        }
    }
    last
}

/// Chess brain whose scores ignore the board: move `m` always scores `bias(m)`.
#[cfg(test)]
pub(crate) fn bias_brain(bias: impl Fn(Move) -> f32) -> Brain {
    use gambit_brain::Layer;

    let biases = (0..OUTPUT_SIZE)
        .map(|i| Move::from_index(i).map_or(0.0, &bias))
        .collect();
    let hidden = Layer::zeros(INPUT_SIZE, 1, Activation::Identity).unwrap();
    let output =
        Layer::from_parts(1, vec![0.0; OUTPUT_SIZE], biases, Activation::Identity).unwrap();
    Brain::new(vec![hidden, output]).unwrap()
}

#[cfg(test)]
mod tests {
    use gambit_engine::PieceKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    fn mv(src: &str, dst: &str) -> Move {
        Move::new(Position::parse(src).unwrap(), Position::parse(dst).unwrap())
    }

    #[test]
    fn test_greedy_picks_best_playable_move() {
        let e2e4 = mv("e2", "e4");
        let mut policy = MovePolicy::new(bias_brain(|m| {
            if m == e2e4 {
                5.0
            } else if m == mv("e7", "e5") || m == mv("e2", "e5") {
                100.0
            } else {
                0.0
            }
        }))
        .unwrap();
        let mut rng = Pcg32::seed_from_u64(0);
        let state = GameState::new();
        let chosen = policy
            .select_move(&state, Color::White, MoveSelection::Greedy, &mut rng)
            .unwrap();
        assert_eq!(chosen, Some(e2e4));

        let chosen = policy
            .select_move(&state, Color::Black, MoveSelection::Greedy, &mut rng)
            .unwrap();
        assert_eq!(chosen, Some(mv("e7", "e5")));
    }

    #[test]
    fn test_greedy_ties_go_to_lowest_index() {
        let mut policy = MovePolicy::new(bias_brain(|_| 0.0)).unwrap();
        let mut rng = Pcg32::seed_from_u64(0);
        let chosen = policy
            .select_move(&GameState::new(), Color::White, MoveSelection::Greedy, &mut rng)
            .unwrap();
        assert_eq!(chosen, Some(mv("a2", "a4")));
    }

    #[test]
    fn test_sampling_only_returns_playable_moves() {
        let mut policy = MovePolicy::new(bias_brain(|m| m.dst.index() as f32 * 0.01)).unwrap();
        let mut rng = Pcg32::seed_from_u64(3);
        let state = GameState::new();
        let selection = MoveSelection::Sample { temperature: 1.0 };
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let chosen = policy
                .select_move(&state, Color::White, selection, &mut rng)
                .unwrap()
                .unwrap();
            assert!(state.board().get(chosen.src).is_color(Color::White));
            assert!(state.safe_move(chosen).is_playable());
            seen.insert(chosen);
        }
        assert!(seen.len() > 5, "sampling should explore, saw {seen:?}");
    }

    #[test]
    fn test_cold_sampling_matches_greedy() {
        let g1f3 = mv("g1", "f3");
        let mut policy =
            MovePolicy::new(bias_brain(|m| if m == g1f3 { 3.0 } else { 0.0 })).unwrap();
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..20 {
            let chosen = policy
                .select_move(
                    &GameState::new(),
                    Color::White,
                    MoveSelection::Sample { temperature: 0.01 },
                    &mut rng,
                )
                .unwrap();
            assert_eq!(chosen, Some(g1f3));
        }
    }

    #[test]
    fn test_no_playable_move() {
        let state = GameState::from_pieces([
            (Position::parse("a8").unwrap(), PieceKind::King, Color::Black),
            (Position::parse("b6").unwrap(), PieceKind::Queen, Color::White),
            (Position::parse("h1").unwrap(), PieceKind::King, Color::White),
        ]);
        let mut policy = MovePolicy::new(bias_brain(|_| 1.0)).unwrap();
        let mut rng = Pcg32::seed_from_u64(5);
        for selection in [MoveSelection::Greedy, MoveSelection::Sample { temperature: 1.0 }] {
            let chosen = policy
                .select_move(&state, Color::Black, selection, &mut rng)
                .unwrap();
            assert_eq!(chosen, None);
        }
    }

    #[test]
    fn test_non_finite_scores_stay_selectable() {
        let a2a3 = mv("a2", "a3");
        let mut policy = MovePolicy::new(bias_brain(|m| {
            if m == a2a3 { f32::INFINITY } else { f32::NAN }
        }))
        .unwrap();
        let mut rng = Pcg32::seed_from_u64(6);
        let state = GameState::new();
        let greedy = policy
            .select_move(&state, Color::White, MoveSelection::Greedy, &mut rng)
            .unwrap();
        assert_eq!(greedy, Some(a2a3));
        let sampled = policy
            .select_move(&state, Color::White, MoveSelection::Sample { temperature: 1.0 }, &mut rng)
            .unwrap();
        assert_eq!(sampled, Some(a2a3));
    }

    #[test]
    fn test_rejects_incompatible_brain_and_temperature() {
        let mut rng = Pcg32::seed_from_u64(7);
        let small = Brain::random(
            4,
            &[LayerSpec::new(2, Activation::Identity)],
            &mut rng,
        )
        .unwrap();
        assert!(matches!(
            MovePolicy::new(small).unwrap_err(),
            PolicyError::IncompatibleBrain {
                input_size: 4,
                output_size: 2
            }
        ));

        let mut policy = MovePolicy::new(bias_brain(|_| 0.0)).unwrap();
        for temperature in [0.0, -1.0, f32::NAN] {
            let err = policy
                .select_move(
                    &GameState::new(),
                    Color::White,
                    MoveSelection::Sample { temperature },
                    &mut rng,
                )
                .unwrap_err();
            assert!(err.is_invalid_temperature());
        }
    }

    #[test]
    fn test_free_function_matches_policy() {
        let mut brain = new_chess_brain(&[8], &mut Pcg32::seed_from_u64(8)).unwrap();
        assert_eq!(brain.input_size(), INPUT_SIZE);
        assert_eq!(brain.output_size(), OUTPUT_SIZE);

        let mut policy = MovePolicy::new(brain.clone()).unwrap();
        let state = GameState::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let a = select_move(&state, &mut brain, Color::Black, MoveSelection::Greedy, &mut rng)
            .unwrap();
        let b = policy
            .select_move(&state, Color::Black, MoveSelection::Greedy, &mut rng)
            .unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_index_inverse_cdf() {
        let weights = [0.0, 0.25, 0.0, 0.5, 0.25];
        assert_eq!(sample_index(&weights, 0.0), Some(1));
        assert_eq!(sample_index(&weights, 0.3), Some(3));
        assert_eq!(sample_index(&weights, 0.8), Some(4));
        assert_eq!(sample_index(&weights, 1.5), Some(4));
        assert_eq!(sample_index(&[0.0, 0.0], 0.5), None);
    }
}
