//! Objective vector computation.

use super::adjacency::AdjacencyRule;
use crate::error::EvaluationError;
use crate::layout::{BuildingArena, Footprint, Site};
use geo::EuclideanDistance;
use std::sync::Arc;

/// Externally supplied objective (physics, accessibility, ...).
///
/// Must be a pure function of the footprints; lower is better. Closures of
/// the matching signature implement this trait.
pub trait ExternalObjective: Send + Sync {
    fn name(&self) -> &str {
        "external"
    }

    fn evaluate(&self, footprints: &[Footprint]) -> Result<f64, EvaluationError>;
}

impl<F> ExternalObjective for F
where
    F: Fn(&[Footprint]) -> Result<f64, EvaluationError> + Send + Sync,
{
    fn evaluate(&self, footprints: &[Footprint]) -> Result<f64, EvaluationError> {
        self(footprints)
    }
}

/// Wraps a closure with a descriptive name for logs and reports.
pub struct NamedObjective<F> {
    name: String,
    function: F,
}

impl<F> NamedObjective<F>
where
    F: Fn(&[Footprint]) -> Result<f64, EvaluationError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, function: F) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }
}

impl<F> ExternalObjective for NamedObjective<F>
where
    F: Fn(&[Footprint]) -> Result<f64, EvaluationError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, footprints: &[Footprint]) -> Result<f64, EvaluationError> {
        (self.function)(footprints)
    }
}

/// One entry of the objective vector.
#[derive(Clone)]
pub enum Objective {
    /// Variance of pairwise centre distances over the squared site diagonal.
    Compactness,
    /// Mean normalized violation of adjacency preferences.
    Adjacency,
    /// Construction cost relative to the most expensive admissible layout.
    Cost,
    External(Arc<dyn ExternalObjective>),
}

impl Objective {
    pub fn name(&self) -> &str {
        match self {
            Objective::Compactness => "compactness",
            Objective::Adjacency => "adjacency",
            Objective::Cost => "cost",
            Objective::External(f) => f.name(),
        }
    }
}

impl std::fmt::Debug for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::External(ext) => write!(f, "External({})", ext.name()),
            other => f.write_str(other.name()),
        }
    }
}

/// Computes a fixed-order objective vector.
///
/// ```
/// use u_siteplan::objectives::{Objective, ObjectiveEvaluator};
///
/// let evaluator = ObjectiveEvaluator::standard();
/// assert_eq!(evaluator.names(), vec!["compactness", "adjacency", "cost"]);
///
/// let two = ObjectiveEvaluator::new(vec![Objective::Compactness, Objective::Cost]);
/// assert_eq!(two.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ObjectiveEvaluator {
    objectives: Vec<Objective>,
    rules: Vec<AdjacencyRule>,
}

impl Default for ObjectiveEvaluator {
    fn default() -> Self {
        Self::standard()
    }
}

impl ObjectiveEvaluator {
    pub fn new(objectives: Vec<Objective>) -> Self {
        Self {
            objectives,
            rules: Vec::new(),
        }
    }

    /// Compactness, adjacency and cost, in that order.
    pub fn standard() -> Self {
        Self::new(vec![
            Objective::Compactness,
            Objective::Adjacency,
            Objective::Cost,
        ])
    }

    /// Appends an external objective at the end of the vector.
    pub fn with_external(mut self, objective: Arc<dyn ExternalObjective>) -> Self {
        self.objectives.push(Objective::External(objective));
        self
    }

    pub fn with_rules(mut self, rules: Vec<AdjacencyRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Number of objectives, fixed for the run.
    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.objectives.iter().map(Objective::name).collect()
    }

    pub fn rules(&self) -> &[AdjacencyRule] {
        &self.rules
    }

    /// Evaluates every objective in order.
    ///
    /// Footprints with non-finite geometry are ignored by the built-in
    /// objectives (they are penalized as constraints instead).
    pub fn evaluate(
        &self,
        footprints: &[Footprint],
        arena: &BuildingArena,
        site: &Site,
    ) -> Result<Vec<f64>, EvaluationError> {
        let finite: Vec<&Footprint> = footprints.iter().filter(|fp| fp.is_finite()).collect();
        self.objectives
            .iter()
            .map(|objective| {
                let value = match objective {
                    Objective::Compactness => compactness(&finite, site),
                    Objective::Adjacency => adjacency_mismatch(&finite, &self.rules, site),
                    Objective::Cost => cost(&finite, arena),
                    Objective::External(f) => f.evaluate(footprints)?,
                };
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(EvaluationError::NonFinite {
                        name: objective.name().to_string(),
                        value,
                    })
                }
            })
            .collect()
    }
}

fn compactness(footprints: &[&Footprint], site: &Site) -> f64 {
    let n = footprints.len();
    if n < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let a = footprints[i].center;
            let b = footprints[j].center;
            let d = (a.x - b.x).hypot(a.y - b.y);
            sum += d;
            sum_sq += d * d;
            count += 1;
        }
    }
    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
    let diagonal = site.diagonal();
    variance / (diagonal * diagonal)
}

fn adjacency_mismatch(footprints: &[&Footprint], rules: &[AdjacencyRule], site: &Site) -> f64 {
    if rules.is_empty() {
        return 0.0;
    }
    let diagonal = site.diagonal();
    let mut mismatch = 0.0;
    let mut weight = 0.0;
    for i in 0..footprints.len() {
        for j in (i + 1)..footprints.len() {
            let (a, b) = (footprints[i], footprints[j]);
            for rule in rules.iter().filter(|r| r.applies(&a.kind, &b.kind)) {
                let gap = a.polygon.euclidean_distance(&b.polygon);
                mismatch += rule.weight * rule.violation(gap) / diagonal;
                weight += rule.weight;
            }
        }
    }
    if weight > 0.0 {
        mismatch / weight
    } else {
        0.0
    }
}

fn cost(footprints: &[&Footprint], arena: &BuildingArena) -> f64 {
    let max = arena.max_total_cost();
    if max <= 0.0 {
        return 0.0;
    }
    let total: f64 = footprints
        .iter()
        .map(|fp| fp.floor_area() * arena.get(fp.building).cost_per_area)
        .sum();
    total / max
}
