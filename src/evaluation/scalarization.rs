//! Scalar fitness for SA acceptance and single-objective GA ranking.

use crate::layout::Evaluation;

/// Weighted-sum scalarization of an [`Evaluation`].
///
/// `fitness = Σ wᵢ·fᵢ + penalty_weight · constraint_total`
///
/// Objectives beyond the length of `objective_weights` get weight 1.
/// The weights are tunables; nothing in the search depends on a particular
/// ratio.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scalarization {
    pub objective_weights: Vec<f64>,
    pub penalty_weight: f64,
}

impl Default for Scalarization {
    fn default() -> Self {
        Self {
            objective_weights: Vec::new(),
            penalty_weight: 10.0,
        }
    }
}

impl Scalarization {
    pub fn new(objective_weights: Vec<f64>, penalty_weight: f64) -> Self {
        Self {
            objective_weights,
            penalty_weight,
        }
    }

    pub fn weight(&self, objective: usize) -> f64 {
        self.objective_weights.get(objective).copied().unwrap_or(1.0)
    }

    pub fn scalarize(&self, evaluation: &Evaluation) -> f64 {
        let objective: f64 = evaluation
            .objectives
            .iter()
            .enumerate()
            .map(|(i, v)| self.weight(i) * v)
            .sum();
        objective + self.penalty_weight * evaluation.constraint_total
    }

    /// Returns the name of the first invalid field and the reason.
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        if !(self.penalty_weight.is_finite() && self.penalty_weight >= 0.0) {
            return Err((
                "scalarization.penalty_weight",
                format!("must be finite and non-negative, got {}", self.penalty_weight),
            ));
        }
        if let Some(w) = self
            .objective_weights
            .iter()
            .find(|w| !(w.is_finite() && **w >= 0.0))
        {
            return Err((
                "scalarization.objective_weights",
                format!("weights must be finite and non-negative, got {w}"),
            ));
        }
        Ok(())
    }
}
