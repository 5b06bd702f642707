//! Uniform crossover over whole building genes.

use crate::layout::{BuildingArena, Genotype, Solution};
use rand::Rng;

/// Uniform crossover.
///
/// For each building, the first child inherits the whole gene tuple from
/// parent A or B with equal probability and the second child takes the
/// other one. Children are unevaluated.
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn uniform_crossover<R: Rng>(
    a: &Solution,
    b: &Solution,
    arena: &BuildingArena,
    rng: &mut R,
) -> (Solution, Solution) {
    let (ga, gb) = (a.genotype().genes(), b.genotype().genes());
    assert_eq!(ga.len(), gb.len(), "parents must have equal length");

    let mut first = Vec::with_capacity(ga.len());
    let mut second = Vec::with_capacity(ga.len());
    for (x, y) in ga.iter().zip(gb) {
        if rng.random_bool(0.5) {
            first.push(*x);
            second.push(*y);
        } else {
            first.push(*y);
            second.push(*x);
        }
    }
    (
        Solution::new(Genotype::new(arena, first)),
        Solution::new(Genotype::new(arena, second)),
    )
}
