//! Shared evaluation budget and cancellation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts evaluations across both phases and signals when to stop.
///
/// Checks happen between units of work (SA iterations, GA generations),
/// so a batch that is already running always completes.
#[derive(Debug, Clone, Default)]
pub struct EvaluationBudget {
    limit: Option<usize>,
    used: Arc<AtomicUsize>,
    cancel: Option<Arc<AtomicBool>>,
}

impl EvaluationBudget {
    /// Budget of at most `limit` evaluations (`None` = unlimited).
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            used: Arc::new(AtomicUsize::new(0)),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn record(&self, evaluations: usize) {
        self.used.fetch_add(evaluations, Ordering::Relaxed);
    }

    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.used() >= limit)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
