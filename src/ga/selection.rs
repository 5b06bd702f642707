//! Parent selection for the genetic phase.
//!
//! Tournaments draw their competitors without replacement, so a tournament
//! of size `k` over at least `k` layouts never pits a layout against itself.
//!
//! # References
//!
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic
//!   Algorithm: NSGA-II" (crowded-comparison operator)

use crate::evaluation::Scalarization;
use crate::layout::Solution;
use rand::seq::index;
use rand::Rng;
use std::cmp::Ordering;

/// How tournament competitors are compared.
///
/// Lower is better in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Criterion {
    /// Scalar fitness.
    #[default]
    Fitness,
    /// Front rank first, then larger crowding distance, then scalar fitness.
    /// Layouts without ranking metadata lose to ranked ones.
    RankCrowding,
}

impl Criterion {
    /// Orders `a` before `b` when `a` is the better parent.
    pub fn compare(&self, a: &Solution, b: &Solution, scalarization: &Scalarization) -> Ordering {
        let by_fitness = || a.fitness(scalarization).total_cmp(&b.fitness(scalarization));
        match self {
            Criterion::Fitness => by_fitness(),
            Criterion::RankCrowding => {
                let key = |s: &Solution| {
                    s.ranking()
                        .map(|r| (r.rank, r.crowding))
                        .unwrap_or((usize::MAX, 0.0))
                };
                let (ra, ca) = key(a);
                let (rb, cb) = key(b);
                ra.cmp(&rb)
                    .then_with(|| cb.total_cmp(&ca))
                    .then_with(by_fitness)
            }
        }
    }
}

/// Runs one tournament and returns the winner's index.
///
/// `k` competitors are drawn without replacement (all of them when the
/// population is smaller than `k`). Ties go to the competitor drawn first.
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament<R: Rng>(
    population: &[Solution],
    k: usize,
    criterion: Criterion,
    scalarization: &Scalarization,
    rng: &mut R,
) -> usize {
    assert!(!population.is_empty(), "cannot select from empty population");
    let n = population.len();
    let amount = k.clamp(1, n);

    let mut competitors = index::sample(rng, n, amount).into_iter();
    let mut winner = competitors.next().unwrap_or(0);
    for challenger in competitors {
        let order = criterion.compare(&population[challenger], &population[winner], scalarization);
        if order == Ordering::Less {
            winner = challenger;
        }
    }
    winner
}

/// Selects `count` parent indices by repeated tournaments.
pub fn select_parents<R: Rng>(
    population: &[Solution],
    count: usize,
    k: usize,
    criterion: Criterion,
    scalarization: &Scalarization,
    rng: &mut R,
) -> Vec<usize> {
    if population.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| tournament(population, k, criterion, scalarization, rng))
        .collect()
}
