//! Immutable evaluation context shared by all workers.

use crate::constraints::ConstraintEvaluator;
use crate::error::EvaluationError;
use crate::layout::{materialize, BuildingArena, Evaluation, Genotype, Site};
use crate::objectives::ObjectiveEvaluator;

/// Everything needed to score a genotype: built once per run, then only
/// read. Shared between workers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    arena: BuildingArena,
    site: Site,
    constraints: ConstraintEvaluator,
    objectives: ObjectiveEvaluator,
}

impl EvaluationContext {
    pub fn new(
        arena: BuildingArena,
        site: Site,
        constraints: ConstraintEvaluator,
        objectives: ObjectiveEvaluator,
    ) -> Self {
        Self {
            arena,
            site,
            constraints,
            objectives,
        }
    }

    pub fn arena(&self) -> &BuildingArena {
        &self.arena
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn constraints(&self) -> &ConstraintEvaluator {
        &self.constraints
    }

    pub fn objectives(&self) -> &ObjectiveEvaluator {
        &self.objectives
    }

    /// Length of every objective vector this context produces.
    pub fn objective_count(&self) -> usize {
        self.objectives.len()
    }

    /// Scores one genotype. Pure: equal genes give equal results.
    pub fn evaluate(&self, genotype: &Genotype) -> Result<Evaluation, EvaluationError> {
        let footprints = materialize(&self.arena, genotype);
        let (constraints, constraint_total) =
            self.constraints.evaluate_total(&footprints, &self.site)?;
        let objectives = self.objectives.evaluate(&footprints, &self.arena, &self.site)?;
        Ok(Evaluation {
            objectives,
            constraints,
            constraint_total,
            failed: false,
        })
    }
}
