//! Generation statistics and refinement results.

use crate::layout::Solution;

/// Snapshot of one generation's population.
///
/// Observational only; nothing in the loop reads it back.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// 0 for the initial population.
    pub generation: usize,

    /// Lowest scalar fitness in the population.
    pub best_fitness: f64,

    /// Mean scalar fitness, sentinels included.
    pub mean_fitness: f64,

    /// Members with a zero constraint total.
    pub feasible_count: usize,

    /// Members on the first constrained non-dominated front.
    pub front_size: usize,
}

/// Result of the genetic refinement phase.
#[derive(Debug, Clone)]
pub struct GaOutcome {
    /// Fittest solution seen in any generation.
    pub best: Solution,

    /// Same as `best.fitness(..)` under the run's scalarization.
    pub best_fitness: f64,

    /// Final population, all evaluated.
    pub population: Vec<Solution>,

    /// Non-dominated archive. Empty unless many-objective mode is active.
    pub archive: Vec<Solution>,

    /// One entry per completed generation, starting with generation 0.
    pub history: Vec<GenerationStats>,

    /// Generations completed after the initial one.
    pub generations: usize,

    /// Stopped early because the evaluation budget ran out.
    pub budget_exhausted: bool,

    /// Stopped early because the caller raised the cancellation flag.
    pub cancelled: bool,
}
