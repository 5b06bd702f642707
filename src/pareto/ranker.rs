//! Many-objective ranking over solutions.

use super::niching::{select_survivors, SurvivorSelection};
use super::reference::ReferenceDirections;
use crate::layout::{Solution, SENTINEL_OBJECTIVE, SENTINEL_PENALTY};

/// Objective count from which many-objective mode switches on by itself.
pub const MANY_OBJECTIVE_THRESHOLD: usize = 4;

/// NSGA-III style ranker with a fixed objective dimensionality.
///
/// Unevaluated solutions, and solutions whose objective vector has the
/// wrong length, are ranked as if they carried sentinel scores.
#[derive(Debug, Clone)]
pub struct ManyObjectiveRanker {
    n_objectives: usize,
    directions: ReferenceDirections,
}

impl ManyObjectiveRanker {
    /// Ranker whose reference lattice is sized for `population_cap`.
    pub fn new(n_objectives: usize, population_cap: usize) -> Self {
        Self {
            n_objectives,
            directions: ReferenceDirections::for_population(n_objectives.max(1), population_cap),
        }
    }

    /// Ranker with an explicit number of lattice divisions.
    pub fn with_divisions(n_objectives: usize, divisions: usize) -> Self {
        Self {
            n_objectives,
            directions: ReferenceDirections::das_dennis(n_objectives.max(1), divisions.max(1)),
        }
    }

    pub fn n_objectives(&self) -> usize {
        self.n_objectives
    }

    pub fn directions(&self) -> &ReferenceDirections {
        &self.directions
    }

    /// Keeps at most `cap` candidates by front, then niche. Survivors carry
    /// fresh ranking metadata and come out front by front.
    pub fn select(&self, candidates: Vec<Solution>, cap: usize) -> Vec<Solution> {
        let selection = self.survivors(&candidates, cap);
        let mut slots: Vec<Option<Solution>> = candidates.into_iter().map(Some).collect();
        selection
            .selected
            .iter()
            .filter_map(|&i| {
                let mut s = slots[i].take()?;
                s.set_ranking(selection.rankings[i]);
                Some(s)
            })
            .collect()
    }

    /// Attaches rank, crowding and niche metadata without removing anyone.
    pub fn rank(&self, solutions: &mut [Solution]) {
        let selection = self.survivors(solutions, solutions.len());
        for (s, r) in solutions.iter_mut().zip(selection.rankings) {
            s.set_ranking(r);
        }
    }

    pub(crate) fn survivors(&self, candidates: &[Solution], cap: usize) -> SurvivorSelection {
        let (objectives, violations) = score_matrix(candidates, self.n_objectives);
        select_survivors(&objectives, &violations, cap, &self.directions)
    }
}

/// Objective vectors and constraint totals, with sentinels for anything
/// that cannot be compared.
pub(crate) fn score_matrix(
    solutions: &[Solution],
    n_objectives: usize,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    solutions
        .iter()
        .map(|s| match s.evaluation() {
            Some(e) if e.objectives.len() == n_objectives => {
                (e.objectives.clone(), e.constraint_total)
            }
            _ => (vec![SENTINEL_OBJECTIVE; n_objectives], SENTINEL_PENALTY),
        })
        .unzip()
}
