//! Fault-tolerant batch evaluation.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::budget::EvaluationBudget;
use super::context::EvaluationContext;
use super::pool::WorkerPool;
use crate::error::EvaluationError;
use crate::layout::{Evaluation, Solution};

/// Evaluates batches of solutions on a [`WorkerPool`].
///
/// A candidate whose evaluation fails (an `Err` from an external callable,
/// a non-finite value, or a panic) receives [`Evaluation::sentinel`] and the
/// batch continues. Solutions that already carry an evaluation are passed
/// through without re-scoring.
#[derive(Debug)]
pub struct ParallelEvaluator {
    context: Arc<EvaluationContext>,
    pool: WorkerPool,
    budget: EvaluationBudget,
    failures: AtomicUsize,
}

impl ParallelEvaluator {
    pub fn new(
        context: Arc<EvaluationContext>,
        pool: WorkerPool,
        budget: EvaluationBudget,
    ) -> Self {
        Self {
            context,
            pool,
            budget,
            failures: AtomicUsize::new(0),
        }
    }

    /// Sequential evaluator with an unlimited budget.
    pub fn sequential(context: Arc<EvaluationContext>) -> Self {
        Self::new(context, WorkerPool::sequential(), EvaluationBudget::default())
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn budget(&self) -> &EvaluationBudget {
        &self.budget
    }

    /// Evaluations performed so far, sentinel ones included.
    pub fn evaluations(&self) -> usize {
        self.budget.used()
    }

    /// Evaluations that ended with a sentinel score.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Evaluates `solutions` across the pool. The output has the same
    /// length and order as the input.
    pub fn evaluate_batch(&self, solutions: &[Solution]) -> Vec<Solution> {
        self.pool.map_ordered(solutions, |s| self.evaluate_local(s))
    }

    /// Evaluates `solutions` on the calling thread.
    ///
    /// Used inside SA chains, which already run one per worker.
    pub fn evaluate_sequential(&self, solutions: &[Solution]) -> Vec<Solution> {
        solutions.iter().map(|s| self.evaluate_local(s)).collect()
    }

    /// Evaluates one solution on the calling thread.
    pub fn evaluate_local(&self, solution: &Solution) -> Solution {
        if solution.is_evaluated() {
            return solution.clone();
        }
        let evaluation = self.score(solution);
        solution.clone().into_evaluated(evaluation)
    }

    /// Like [`evaluate_local`](Self::evaluate_local) but consumes the input.
    pub fn evaluate_owned(&self, solution: Solution) -> Solution {
        if solution.is_evaluated() {
            return solution;
        }
        let evaluation = self.score(&solution);
        solution.into_evaluated(evaluation)
    }

    fn score(&self, solution: &Solution) -> Evaluation {
        self.budget.record(1);
        let context = &self.context;
        let outcome = catch_unwind(AssertUnwindSafe(|| context.evaluate(solution.genotype())));
        let error = match outcome {
            Ok(Ok(evaluation)) => return evaluation,
            Ok(Err(err)) => err,
            Err(payload) => EvaluationError::Panicked(panic_message(payload.as_ref())),
        };
        self.failures.fetch_add(1, Ordering::Relaxed);
        log::warn!("evaluation failed, assigning sentinel score: {error}");
        Evaluation::sentinel(context.objective_count())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
