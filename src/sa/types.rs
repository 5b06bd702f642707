//! Chain state and reports.

use crate::layout::Solution;

/// Why a chain finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// Temperature dropped below the final temperature.
    Cooled,
    /// The per-chain iteration cap was reached.
    MaxIterations,
    /// The run-wide evaluation budget ran out.
    BudgetExhausted,
    /// The caller raised the cancellation flag.
    Cancelled,
}

/// Lifecycle of one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Running,
    Done(StopReason),
}

impl ChainState {
    pub fn is_done(&self) -> bool {
        matches!(self, ChainState::Done(_))
    }
}

/// Statistics of one finished chain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainReport {
    /// Chain index.
    pub chain: usize,

    /// Seed of the chain's random stream.
    pub seed: u64,

    pub stop_reason: StopReason,

    /// Moves attempted.
    pub iterations: usize,

    /// Moves accepted, improving ones included.
    pub accepted_moves: usize,

    /// Moves that lowered the current fitness.
    pub improving_moves: usize,

    pub final_temperature: f64,

    pub best_fitness: f64,

    /// Current fitness after every iteration, starting with the initial
    /// solution.
    pub trajectory: Vec<f64>,
}

/// Output of the annealing phase.
#[derive(Debug, Clone)]
pub struct SaOutcome {
    /// Pooled seeds: each chain's best, followed by its final solution when
    /// that differs. All evaluated.
    pub seeds: Vec<Solution>,

    /// One report per chain, in chain order.
    pub reports: Vec<ChainReport>,
}

impl SaOutcome {
    /// Fittest seed's fitness across all chains.
    pub fn best_fitness(&self) -> f64 {
        self.reports
            .iter()
            .map(|r| r.best_fitness)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn total_iterations(&self) -> usize {
        self.reports.iter().map(|r| r.iterations).sum()
    }
}
