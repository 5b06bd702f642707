//! Candidate layouts and their scores.
//!
//! A [`Solution`] can only gain an [`Evaluation`] through the evaluation
//! module, and every genotype change produces a fresh, unevaluated
//! solution. Reading a fitness that belongs to different genes is therefore
//! impossible.

use super::genotype::Genotype;
use crate::constraints::ConstraintBreakdown;
use crate::evaluation::Scalarization;

/// Objective value assigned to every objective of a failed evaluation.
pub const SENTINEL_OBJECTIVE: f64 = 1.0e12;

/// Constraint total assigned to a failed evaluation.
pub const SENTINEL_PENALTY: f64 = 1.0e12;

/// Scores attached to one genotype state.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// Objective vector in evaluator order, lower is better.
    pub objectives: Vec<f64>,
    /// Unweighted violation magnitude per constraint category.
    pub constraints: ConstraintBreakdown,
    /// Weighted sum of `constraints`; zero means feasible.
    pub constraint_total: f64,
    /// Set when the candidate could not be evaluated and holds sentinel values.
    pub failed: bool,
}

impl Evaluation {
    /// Worst-case scores for a candidate whose evaluation failed.
    pub fn sentinel(objective_count: usize) -> Self {
        Self {
            objectives: vec![SENTINEL_OBJECTIVE; objective_count],
            constraints: ConstraintBreakdown::default(),
            constraint_total: SENTINEL_PENALTY,
            failed: true,
        }
    }

    pub fn is_feasible(&self) -> bool {
        !self.failed && self.constraint_total <= 0.0
    }
}

/// Many-objective ranking metadata, recomputed at every survivor selection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ranking {
    /// Non-domination front index, 0 is the Pareto front.
    pub rank: usize,
    /// Crowding distance within the front (larger is more isolated).
    pub crowding: f64,
    /// Associated reference direction, when niching ran.
    pub niche: Option<usize>,
    /// Perpendicular distance to `niche`.
    pub niche_distance: f64,
}

/// A candidate layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    genotype: Genotype,
    evaluation: Option<Evaluation>,
    ranking: Option<Ranking>,
}

impl Solution {
    /// Unevaluated solution owning `genotype`.
    pub fn new(genotype: Genotype) -> Self {
        Self {
            genotype,
            evaluation: None,
            ranking: None,
        }
    }

    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    /// New unevaluated solution carrying `genotype`.
    pub fn with_genotype(&self, genotype: Genotype) -> Self {
        Self::new(genotype)
    }

    /// Copy-on-write edit: clones the genes, applies `edit`, returns an
    /// unevaluated solution. `self` is left untouched.
    pub fn edited<F: FnOnce(&mut Genotype)>(&self, edit: F) -> Self {
        let mut genotype = self.genotype.clone();
        edit(&mut genotype);
        Self::new(genotype)
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    pub fn objectives(&self) -> Option<&[f64]> {
        self.evaluation.as_ref().map(|e| e.objectives.as_slice())
    }

    pub fn constraint_total(&self) -> Option<f64> {
        self.evaluation.as_ref().map(|e| e.constraint_total)
    }

    /// Evaluated, not failed, and zero total violation.
    pub fn is_feasible(&self) -> bool {
        self.evaluation.as_ref().is_some_and(Evaluation::is_feasible)
    }

    /// Scalar fitness under `scalarization`; `+∞` while unevaluated.
    pub fn fitness(&self, scalarization: &Scalarization) -> f64 {
        self.evaluation
            .as_ref()
            .map_or(f64::INFINITY, |e| scalarization.scalarize(e))
    }

    pub fn ranking(&self) -> Option<&Ranking> {
        self.ranking.as_ref()
    }

    pub(crate) fn set_ranking(&mut self, ranking: Ranking) {
        self.ranking = Some(ranking);
    }

    /// Attaches scores computed for the current genes.
    pub(crate) fn into_evaluated(mut self, evaluation: Evaluation) -> Self {
        self.evaluation = Some(evaluation);
        self.ranking = None;
        self
    }
}
