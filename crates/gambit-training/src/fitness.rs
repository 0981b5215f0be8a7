//! Fitness aggregation and ranking.
//!
//! A brain's fitness is the sum, over every match it played, of its own score minus
//! its opponent's score. Results are attributed by pairing, so the order in which
//! matches finished does not matter.

use crate::arena::MatchResult;

/// Differential fitness of every brain in a population of `population` brains.
#[must_use]
pub fn aggregate(population: usize, results: &[MatchResult]) -> Vec<f32> {
    let mut fitness = vec![0.0; population];
    for result in results {
        let diff = result.white_score - result.black_score;
        fitness[result.pairing.white] += diff;
        fitness[result.pairing.black] -= diff;
    }
    fitness
}

/// Population indices ordered from best to worst.
///
/// Equal fitness keeps the lower index first.
#[must_use]
pub fn rank(fitness: &[f32]) -> Vec<usize> {
    let mut order = (0..fitness.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
    order
}

#[cfg(test)]
mod tests {
    use gambit_evaluator::Termination;

    use super::*;
    use crate::schedule::Pairing;

    fn result(white: usize, black: usize, white_score: f32, black_score: f32) -> MatchResult {
        MatchResult {
            pairing: Pairing { white, black },
            white_score,
            black_score,
            plies: 10,
            termination: Termination::PlyLimit,
        }
    }

    #[test]
    fn test_aggregate_is_differential() {
        let results = [
            result(0, 1, 5.0, 2.0),
            result(1, 0, 1.0, 1.0),
            result(2, 1, 0.0, 4.0),
        ];
        assert_eq!(aggregate(4, &results), [3.0, 1.0, -4.0, 0.0]);
    }

    #[test]
    fn test_aggregate_ignores_order() {
        let mut results = vec![
            result(0, 1, 5.0, 2.0),
            result(2, 0, 3.0, 0.5),
            result(1, 2, -1.0, 2.0),
        ];
        let forward = aggregate(3, &results);
        results.reverse();
        assert_eq!(aggregate(3, &results), forward);
        assert_eq!(forward.iter().sum::<f32>(), 0.0);
    }

    #[test]
    fn test_rank_descending_with_stable_ties() {
        let fitness = [1.0, 3.0, -2.0, 3.0, 1.0];
        assert_eq!(rank(&fitness), [1, 3, 0, 4, 2]);
    }

    #[test]
    fn test_rank_handles_nan() {
        let fitness = [0.0, f32::NAN, 1.0];
        let order = rank(&fitness);
        assert_eq!(order.len(), 3);
        assert_eq!(order[1..], [2, 0]);
    }
}
