use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

/// Two population indices playing one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Pairing {
    pub white: usize,
    pub black: usize,
}

/// How the games of a generation are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Schedule {
    /// Consecutive population indices form groups of `group_size`; every brain plays
    /// every other brain of its group once with each colour. A trailing group of one
    /// joins the group before it.
    RoundRobin { group_size: usize },
    /// `games_per_brain` rounds; each round shuffles the population and pairs it up,
    /// with random colours. With an odd population the brain left over in a round
    /// plays a random opponent, which then plays one extra game.
    Random { games_per_brain: usize },
}

impl Default for Schedule {
    fn default() -> Self {
        Self::RoundRobin { group_size: 4 }
    }
}

impl Schedule {
    /// Draws the games of one generation for a population of `population` brains.
    ///
    /// No pairing ever puts a brain against itself. Populations of fewer than two
    /// brains get no games.
    #[must_use]
    pub fn pairings<R>(&self, population: usize, rng: &mut R) -> Vec<Pairing>
    where
        R: Rng + ?Sized,
    {
        if population < 2 {
            return vec![];
        }
        match *self {
            Self::RoundRobin { group_size } => round_robin(population, group_size.max(2)),
            Self::Random { games_per_brain } => random_pairs(population, games_per_brain, rng),
        }
    }
}

fn round_robin(population: usize, group_size: usize) -> Vec<Pairing> {
    let mut groups = (0..population)
        .step_by(group_size)
        .map(|start| start..(start + group_size).min(population))
        .collect::<Vec<_>>();
    if groups.len() > 1
        && let Some(last) = groups.last()
        && last.len() == 1
    {
        let end = last.end;
        groups.pop();
        if let Some(prev) = groups.last_mut() {
            prev.end = end;
        }
    }

    let mut pairings = vec![];
    for group in groups {
        for white in group.clone() {
            for black in group.clone() {
                if white != black {
                    pairings.push(Pairing { white, black });
                }
            }
        }
    }
    pairings
}

fn random_pairs<R>(population: usize, games_per_brain: usize, rng: &mut R) -> Vec<Pairing>
where
    R: Rng + ?Sized,
{
    let mut order = (0..population).collect::<Vec<_>>();
    let mut pairings = vec![];
    for _ in 0..games_per_brain {
        order.shuffle(rng);
        let chunks = order.chunks_exact(2);
        if let [odd] = *chunks.remainder() {
            let mut other = rng.random_range(0..population - 1);
            if other >= odd {
                other += 1;
            }
            pairings.push(colored(odd, other, rng));
        }
        for pair in chunks {
            pairings.push(colored(pair[0], pair[1], rng));
        }
    }
    pairings
}

fn colored<R>(a: usize, b: usize, rng: &mut R) -> Pairing
where
    R: Rng + ?Sized,
{
    if rng.random_bool(0.5) {
        Pairing { white: a, black: b }
    } else {
        Pairing { white: b, black: a }
    }
}
