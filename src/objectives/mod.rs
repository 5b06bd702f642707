//! Objective evaluation.
//!
//! All objectives are minimized. The built-in ones are normalized so that
//! they are comparable across sites of different size:
//!
//! - [`Objective::Compactness`]: spread of inter-building distances
//! - [`Objective::Adjacency`]: unmet [`AdjacencyRule`]s
//! - [`Objective::Cost`]: construction-cost proxy in `[0, 1]`
//!
//! Any number of [`ExternalObjective`]s can be appended; the vector length
//! is fixed for a run.

mod adjacency;
mod evaluator;

pub use adjacency::{AdjacencyRule, Preference};
pub use evaluator::{ExternalObjective, NamedObjective, Objective, ObjectiveEvaluator};
