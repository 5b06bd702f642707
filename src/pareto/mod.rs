//! Many-objective ranking.
//!
//! Building blocks of NSGA-III survivor selection, used by the genetic
//! phase when many-objective mode is active:
//!
//! - [`non_dominated_sort`] / [`constrained_non_dominated_sort`]: fronts
//! - [`crowding_distance`]: secondary tournament criterion
//! - [`ReferenceDirections`]: Das-Dennis simplex lattice
//! - [`select_survivors`]: front filling plus niching
//! - [`ManyObjectiveRanker`]: the above over [`Solution`](crate::layout::Solution)s
//! - [`ParetoArchive`]: bounded set of non-dominated solutions
//!
//! Crowding distance alone degrades once objectives outnumber three, since
//! almost every vector ends up non-dominated and on a boundary; niching
//! against fixed directions keeps the selection spread.

mod archive;
mod niching;
mod ranker;
mod reference;
mod sorting;

pub use archive::ParetoArchive;
pub use niching::{select_survivors, SurvivorSelection};
pub use ranker::{ManyObjectiveRanker, MANY_OBJECTIVE_THRESHOLD};
pub(crate) use ranker::score_matrix;
pub use reference::{divisions_for, lattice_size, perpendicular_distance, ReferenceDirections};
pub use sorting::{
    constrained_dominance, constrained_non_dominated_sort, crowding_distance, dominance, dominates,
    non_dominated_sort, Dominance, NondominatedSortResult,
};
