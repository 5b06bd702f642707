//! Candidate evaluation.
//!
//! The [`EvaluationContext`] combines constraint and objective evaluation
//! into one pure function of a genotype. [`ParallelEvaluator`] runs it over
//! batches on a fixed-size [`WorkerPool`], converts per-candidate failures
//! into sentinel scores and keeps results in input order.
//!
//! # Parallelism
//!
//! Workers are OS threads from a dedicated `rayon` pool. The context is
//! immutable and shared through an `Arc`, so nothing needs to be copied per
//! batch. Parallel regions never nest: SA chains evaluate their own moves
//! sequentially, and GA batches are the only other parallel region.

mod budget;
mod context;
mod parallel;
mod pool;
mod scalarization;

pub use budget::EvaluationBudget;
pub use context::EvaluationContext;
pub use parallel::ParallelEvaluator;
pub use pool::WorkerPool;
pub use scalarization::Scalarization;
