//! Bounded archive of mutually non-dominated solutions.

use super::niching::select_survivors;
use super::ranker::score_matrix;
use super::reference::ReferenceDirections;
use super::sorting::constrained_non_dominated_sort;
use crate::layout::Solution;

/// Pareto archive kept across generations.
///
/// Members are always mutually non-dominated. When more than `capacity`
/// of them qualify, the archive is thinned by reference-direction niching
/// instead of plain truncation.
#[derive(Debug, Clone)]
pub struct ParetoArchive {
    capacity: usize,
    n_objectives: usize,
    directions: ReferenceDirections,
    members: Vec<Solution>,
}

impl ParetoArchive {
    pub fn new(n_objectives: usize, capacity: usize) -> Self {
        Self::with_directions(
            n_objectives,
            capacity,
            ReferenceDirections::for_population(n_objectives.max(1), capacity),
        )
    }

    pub fn with_directions(
        n_objectives: usize,
        capacity: usize,
        directions: ReferenceDirections,
    ) -> Self {
        Self {
            capacity,
            n_objectives,
            directions,
            members: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Solution] {
        &self.members
    }

    pub fn into_members(self) -> Vec<Solution> {
        self.members
    }

    /// Merges `newcomers` into the archive.
    ///
    /// Unevaluated and failed solutions are ignored, as are objective
    /// vectors already present. Returns the new archive size.
    pub fn update(&mut self, newcomers: &[Solution]) -> usize {
        let m = self.n_objectives;
        let mut pool: Vec<Solution> = std::mem::take(&mut self.members);
        for s in newcomers {
            let usable = s
                .evaluation()
                .is_some_and(|e| !e.failed && e.objectives.len() == m);
            if usable && !pool.iter().any(|p| same_objectives(p, s)) {
                pool.push(s.clone());
            }
        }
        if pool.is_empty() || self.capacity == 0 {
            return 0;
        }

        let (objectives, violations) = score_matrix(&pool, m);
        let sort = constrained_non_dominated_sort(&objectives, &violations);
        let front = sort.fronts.first().cloned().unwrap_or_default();

        let keep: Vec<usize> = if front.len() > self.capacity {
            let front_objs: Vec<Vec<f64>> = front.iter().map(|&i| objectives[i].clone()).collect();
            let front_viol: Vec<f64> = front.iter().map(|&i| violations[i]).collect();
            let mut chosen: Vec<usize> =
                select_survivors(&front_objs, &front_viol, self.capacity, &self.directions)
                    .selected
                    .into_iter()
                    .map(|k| front[k])
                    .collect();
            chosen.sort_unstable();
            chosen
        } else {
            front
        };

        let mut slots: Vec<Option<Solution>> = pool.into_iter().map(Some).collect();
        self.members = keep.into_iter().filter_map(|i| slots[i].take()).collect();
        log::debug!("pareto archive holds {} solutions", self.members.len());
        self.members.len()
    }
}

fn same_objectives(a: &Solution, b: &Solution) -> bool {
    match (a.objectives(), b.objectives()) {
        (Some(x), Some(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| p.to_bits() == q.to_bits())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintBreakdown;
    use crate::layout::{BuildingArena, BuildingSpec, Evaluation, Genotype};
    use crate::pareto::dominates;
    use proptest::prelude::*;

    fn solution(objectives: Vec<f64>, total: f64) -> Solution {
        let arena = BuildingArena::new(vec![BuildingSpec::new("a", "k", 1.0, 1.0)]).unwrap();
        Solution::new(Genotype::from_positions(&arena, &[(0.0, 0.0)])).into_evaluated(Evaluation {
            objectives,
            constraints: ConstraintBreakdown::default(),
            constraint_total: total,
            failed: false,
        })
    }

    #[test]
    fn test_dominated_members_are_dropped() {
        let mut archive = ParetoArchive::new(2, 10);
        archive.update(&[solution(vec![2.0, 2.0], 0.0), solution(vec![1.0, 3.0], 0.0)]);
        assert_eq!(archive.len(), 2);
        archive.update(&[solution(vec![1.0, 1.0], 0.0)]);
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.members()[0].objectives().unwrap(), &[1.0, 1.0]);
    }

    #[test]
    fn test_duplicates_and_failures_ignored() {
        let mut archive = ParetoArchive::new(2, 10);
        archive.update(&[solution(vec![1.0, 2.0], 0.0), solution(vec![1.0, 2.0], 0.0)]);
        assert_eq!(archive.len(), 1);
        let unevaluated = Solution::new(archive.members()[0].genotype().clone());
        archive.update(&[unevaluated]);
        assert_eq!(archive.len(), 1);
        let mut failed = Evaluation::sentinel(2);
        failed.objectives = vec![0.0, 0.0];
        let broken = Solution::new(archive.members()[0].genotype().clone()).into_evaluated(failed);
        archive.update(&[broken]);
        assert_eq!(archive.members()[0].objectives().unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_feasible_beats_infeasible() {
        let mut archive = ParetoArchive::new(2, 10);
        archive.update(&[solution(vec![0.0, 0.0], 1.0), solution(vec![5.0, 5.0], 0.0)]);
        assert_eq!(archive.len(), 1);
        assert!(archive.members()[0].is_feasible());
    }

    proptest! {
        #[test]
        fn prop_bounded_and_non_dominated(
            batches in prop::collection::vec(
                prop::collection::vec(prop::collection::vec(0.0f64..1.0, 4), 1..20),
                1..5,
            ),
            capacity in 1usize..12,
        ) {
            let mut archive = ParetoArchive::new(4, capacity);
            for batch in batches {
                let sols: Vec<Solution> = batch.into_iter().map(|o| solution(o, 0.0)).collect();
                archive.update(&sols);
                prop_assert!(archive.len() <= capacity);
                prop_assert!(!archive.is_empty());
                for a in archive.members() {
                    for b in archive.members() {
                        prop_assert!(!dominates(a.objectives().unwrap(), b.objectives().unwrap()));
                    }
                }
            }
        }
    }
}
