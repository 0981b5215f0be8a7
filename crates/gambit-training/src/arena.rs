//! Parallel match play.
//!
//! A generation's matches are identified by their index in the pairing list. The
//! ids are split into contiguous chunks, one per worker thread, and every worker
//! writes only into its own slice of the results buffer. Each match draws from its
//! own random stream, so results do not depend on the number of workers.
//!
//! ```text
//! pairings   [0 1 2 3 | 4 5 6 7 | 8 9]
//!              worker 0  worker 1  worker 2
//! results    [0 1 2 3 | 4 5 6 7 | 8 9]
//! ```

use std::{iter, thread};

use gambit_brain::Brain;
use gambit_engine::Color;
use gambit_evaluator::{
    MatchConfig, MoveSelection, MovePolicy, PolicyError, Termination, play_match,
};
use tracing::debug;

use crate::{
    error::TrainingError,
    schedule::Pairing,
    streams::{self, Stream},
};

/// Scores of one finished match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub pairing: Pairing,
    pub white_score: f32,
    pub black_score: f32,
    pub plies: usize,
    pub termination: Termination,
}

/// Settings shared by every match of one generation.
#[derive(Debug, Clone, Copy)]
pub struct Arena<'a> {
    pub matches: &'a MatchConfig,
    pub selection: MoveSelection,
    pub seed: u64,
    pub generation: u64,
    pub threads: usize,
}

impl Arena<'_> {
    /// Plays every pairing among `brains` and returns the results in pairing order.
    ///
    /// Fails if any match fails or any worker panics; no partial results are returned.
    pub fn play(
        &self,
        brains: &[Brain],
        pairings: &[Pairing],
    ) -> Result<Vec<MatchResult>, TrainingError> {
        if pairings.is_empty() {
            return Ok(vec![]);
        }

        let mut results = vec![None; pairings.len()];
        let chunk_size = pairings.len().div_ceil(self.threads.max(1));
        let mut first_error = None;

        thread::scope(|s| {
            let handles = pairings
                .chunks(chunk_size)
                .zip(results.chunks_mut(chunk_size))
                .enumerate()
                .map(|(worker, (pairings, results))| {
                    let first_id = worker * chunk_size;
                    s.spawn(move || self.play_chunk(brains, first_id, pairings, results))
                })
                .collect::<Vec<_>>();

            // every handle is joined so that a panicking worker does not re-panic the scope
            for (worker, handle) in handles.into_iter().enumerate() {
                let outcome = handle
                    .join()
                    .map_err(|_| TrainingError::WorkerPanicked { worker })
                    .and_then(|res| res);
                if let Err(e) = outcome
                    && first_error.is_none()
                {
                    first_error = Some(e);
                }
            }
        });

        if let Some(e) = first_error {
            return Err(e);
        }
        results
            .into_iter()
            .enumerate()
            .map(|(match_id, result)| result.ok_or(TrainingError::MissingResult { match_id }))
            .collect()
    }

    fn play_chunk(
        &self,
        brains: &[Brain],
        first_id: usize,
        pairings: &[Pairing],
        results: &mut [Option<MatchResult>],
    ) -> Result<(), TrainingError> {
        let mut policies = iter::repeat_with(|| None)
            .take(brains.len())
            .collect::<Vec<Option<MovePolicy>>>();

        for (offset, (&pairing, slot)) in pairings.iter().zip(results).enumerate() {
            let match_id = first_id + offset;
            let mut rng = streams::rng(
                self.seed,
                Stream::Match {
                    generation: self.generation,
                    match_id,
                },
            );
            let policy_error = |source: PolicyError| TrainingError::Match {
                match_id,
                source: source.into(),
            };

            let mut white =
                take_policy(&mut policies, brains, pairing.white).map_err(policy_error)?;
            let mut black = if pairing.black == pairing.white {
                white.clone()
            } else {
                take_policy(&mut policies, brains, pairing.black).map_err(policy_error)?
            };
            let outcome = play_match(
                &mut white,
                &mut black,
                self.selection,
                self.matches,
                &mut rng,
            );
            policies[pairing.white] = Some(white);
            if pairing.black != pairing.white {
                policies[pairing.black] = Some(black);
            }
            let outcome = outcome.map_err(|source| TrainingError::Match { match_id, source })?;

            let result = MatchResult {
                pairing,
                white_score: outcome.score(Color::White),
                black_score: outcome.score(Color::Black),
                plies: outcome.plies(),
                termination: outcome.termination(),
            };
            debug!(
                generation = self.generation,
                match_id,
                white = pairing.white,
                black = pairing.black,
                white_score = result.white_score,
                black_score = result.black_score,
                plies = result.plies,
                termination = %result.termination,
                "match finished"
            );
            *slot = Some(result);
        }
        Ok(())
    }
}

/// Takes the worker's policy for brain `index`, cloning the brain on first use.
fn take_policy(
    policies: &mut [Option<MovePolicy>],
    brains: &[Brain],
    index: usize,
) -> Result<MovePolicy, PolicyError> {
    match policies[index].take() {
        Some(policy) => Ok(policy),
        None => MovePolicy::new(brains[index].clone()),
    }
}
