//! NSGA-III survivor selection.
//!
//! # Algorithm (Deb & Jain, 2014)
//!
//! 1. Sort the candidates into fronts (constrained dominance)
//! 2. Accept whole fronts while they fit under the cap
//! 3. Normalize the accepted set plus the overflowing front by its ideal
//!    and nadir points
//! 4. Associate each candidate with the nearest reference direction
//! 5. Fill the remaining slots from the overflowing front, preferring the
//!    least crowded direction, then the smaller perpendicular distance,
//!    then the smaller constraint violation, then input order
//!
//! The last step is deterministic; no random tie-breaking is involved.

use super::reference::ReferenceDirections;
use super::sorting::{constrained_non_dominated_sort, crowding_distance};
use crate::layout::Ranking;
use std::cmp::Ordering;

/// Outcome of [`select_survivors`].
#[derive(Debug, Clone, Default)]
pub struct SurvivorSelection {
    /// Chosen candidate indices, front by front.
    pub selected: Vec<usize>,
    /// Ranking metadata for every candidate, selected or not.
    pub rankings: Vec<Ranking>,
}

/// Picks at most `cap` survivors from the candidate vectors.
///
/// # Panics
/// Panics if `objectives` and `violations` differ in length.
pub fn select_survivors(
    objectives: &[Vec<f64>],
    violations: &[f64],
    cap: usize,
    directions: &ReferenceDirections,
) -> SurvivorSelection {
    let sort = constrained_non_dominated_sort(objectives, violations);
    let mut rankings: Vec<Ranking> = sort
        .ranks
        .iter()
        .map(|&rank| Ranking {
            rank,
            crowding: 0.0,
            niche: None,
            niche_distance: f64::INFINITY,
        })
        .collect();

    for front in &sort.fronts {
        let vectors: Vec<Vec<f64>> = front.iter().map(|&i| objectives[i].clone()).collect();
        for (&i, d) in front.iter().zip(crowding_distance(&vectors)) {
            rankings[i].crowding = d;
        }
    }

    let mut selected = Vec::with_capacity(cap.min(objectives.len()));
    let mut overflow: &[usize] = &[];
    for front in &sort.fronts {
        if selected.len() + front.len() <= cap {
            selected.extend_from_slice(front);
        } else {
            overflow = front.as_slice();
            break;
        }
    }

    let considered: Vec<usize> = selected.iter().chain(overflow).copied().collect();
    if considered.is_empty() || directions.is_empty() {
        return SurvivorSelection { selected, rankings };
    }

    let normalized = normalize(objectives, &considered);
    for (&i, point) in considered.iter().zip(&normalized) {
        let (niche, distance) = directions.associate(point);
        rankings[i].niche = Some(niche);
        rankings[i].niche_distance = distance;
    }

    let remaining = cap.saturating_sub(selected.len());
    if remaining > 0 && !overflow.is_empty() {
        let mut counts = vec![0usize; directions.len()];
        for &i in &selected {
            if let Some(n) = rankings[i].niche {
                counts[n] += 1;
            }
        }

        let mut pool: Vec<usize> = overflow.to_vec();
        for _ in 0..remaining {
            let Some(pos) = pool
                .iter()
                .enumerate()
                .min_by(|a, b| niche_order(*a.1, *b.1, &rankings, &counts, violations))
                .map(|(pos, _)| pos)
            else {
                break;
            };
            let chosen = pool.swap_remove(pos);
            if let Some(n) = rankings[chosen].niche {
                counts[n] += 1;
            }
            selected.push(chosen);
        }
    }

    SurvivorSelection { selected, rankings }
}

fn niche_order(
    a: usize,
    b: usize,
    rankings: &[Ranking],
    counts: &[usize],
    violations: &[f64],
) -> Ordering {
    let count = |i: usize| rankings[i].niche.map_or(usize::MAX, |n| counts[n]);
    count(a)
        .cmp(&count(b))
        .then_with(|| total_cmp(rankings[a].niche_distance, rankings[b].niche_distance))
        .then_with(|| total_cmp(violations[a], violations[b]))
        .then(a.cmp(&b))
}

fn total_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Translates by the ideal point and scales by the ideal-nadir range of the
/// given subset. Objectives with zero range are only translated.
fn normalize(objectives: &[Vec<f64>], subset: &[usize]) -> Vec<Vec<f64>> {
    let m = objectives[subset[0]].len();
    let mut ideal = vec![f64::INFINITY; m];
    let mut nadir = vec![f64::NEG_INFINITY; m];
    for &i in subset {
        for (k, &v) in objectives[i].iter().enumerate() {
            ideal[k] = ideal[k].min(v);
            nadir[k] = nadir[k].max(v);
        }
    }
    subset
        .iter()
        .map(|&i| {
            objectives[i]
                .iter()
                .enumerate()
                .map(|(k, &v)| {
                    let range = nadir[k] - ideal[k];
                    if range > 1e-12 {
                        (v - ideal[k]) / range
                    } else {
                        v - ideal[k]
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pareto::sorting::dominates;
    use proptest::prelude::*;

    #[test]
    fn test_whole_fronts_fit() {
        let objs = vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![3.0, 3.0]];
        let dirs = ReferenceDirections::for_population(2, 3);
        let out = select_survivors(&objs, &[0.0; 3], 3, &dirs);
        assert_eq!(out.selected, vec![0, 1, 2]);
        assert_eq!(out.rankings[2].rank, 1);
    }

    #[test]
    fn test_overflow_spreads_over_directions() {
        // a crowd near one end of the front and one lonely extreme
        let objs = vec![
            vec![0.0, 1.0],
            vec![0.01, 0.99],
            vec![0.02, 0.98],
            vec![1.0, 0.0],
        ];
        let dirs = ReferenceDirections::das_dennis(2, 1);
        let out = select_survivors(&objs, &[0.0; 4], 2, &dirs);
        assert_eq!(out.selected.len(), 2);
        assert!(out.selected.contains(&3), "{:?}", out.selected);
        assert!(out.selected.contains(&0), "{:?}", out.selected);
    }

    #[test]
    fn test_ties_are_deterministic() {
        // identical objective vectors, equal niche and distance
        let objs = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let violations = [0.0, 0.0];
        let dirs = ReferenceDirections::das_dennis(2, 2);
        let out = select_survivors(&objs, &violations, 1, &dirs);
        assert_eq!(out.selected, vec![0]);

        // when they differ in feasibility the sort already separates them
        let out = select_survivors(&objs, &[3.0, 0.0], 1, &dirs);
        assert_eq!(out.selected, vec![1]);
    }

    #[test]
    fn test_zero_cap() {
        let objs = vec![vec![1.0, 1.0]];
        let dirs = ReferenceDirections::das_dennis(2, 1);
        assert!(select_survivors(&objs, &[0.0], 0, &dirs).selected.is_empty());
    }

    fn vectors() -> impl Strategy<Value = Vec<Vec<f64>>> {
        prop::collection::vec(prop::collection::vec(0.0f64..1.0, 4), 1..60)
    }

    proptest! {
        #[test]
        fn prop_respects_cap_and_fronts(objs in vectors(), cap in 1usize..30) {
            let violations = vec![0.0; objs.len()];
            let dirs = ReferenceDirections::for_population(4, cap);
            let out = select_survivors(&objs, &violations, cap, &dirs);
            prop_assert_eq!(out.selected.len(), cap.min(objs.len()));

            let mut unique = out.selected.clone();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(unique.len(), out.selected.len());

            // nothing rejected dominates the whole selection's worst front
            let worst = out.selected.iter().map(|&i| out.rankings[i].rank).max().unwrap_or(0);
            for i in 0..objs.len() {
                if !out.selected.contains(&i) {
                    prop_assert!(out.rankings[i].rank >= worst);
                }
            }
        }

        #[test]
        fn prop_first_front_selection_is_non_dominated(objs in vectors(), cap in 1usize..10) {
            let violations = vec![0.0; objs.len()];
            let dirs = ReferenceDirections::for_population(4, cap);
            let out = select_survivors(&objs, &violations, cap, &dirs);
            let front0: Vec<usize> = out
                .selected
                .iter()
                .copied()
                .filter(|&i| out.rankings[i].rank == 0)
                .collect();
            for &a in &front0 {
                for &b in &front0 {
                    prop_assert!(!dominates(&objs[a], &objs[b]));
                }
            }
        }
    }
}
