//! Non-dominated sorting and crowding distance.
//!
//! All objectives are **minimized**.
//!
//! # Algorithms
//!
//! - [`non_dominated_sort`]: fast non-dominated sorting (Deb et al., 2002)
//! - [`constrained_non_dominated_sort`]: the same over constrained
//!   dominance, where feasibility is compared first (Deb, 2000)
//! - [`crowding_distance`]: density estimate within one front
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - Deb (2000), "An Efficient Constraint Handling Method for Genetic Algorithms"

use std::cmp::Ordering;

/// Result of non-dominated sorting.
///
/// `ranks[i]` is the front index of input `i`; rank 0 is the Pareto front.
#[derive(Debug, Clone, Default)]
pub struct NondominatedSortResult {
    /// Pareto rank for each input (0 = front).
    pub ranks: Vec<usize>,
    /// Indices grouped by front, ascending within each front.
    pub fronts: Vec<Vec<usize>>,
}

/// Pareto dominance relation between two objective vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Compares two objective vectors for Pareto dominance.
pub fn dominance(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// `a` is no worse than `b` everywhere and strictly better somewhere.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance(a, b) == Dominance::Left
}

/// Constrained dominance: a feasible vector beats an infeasible one, of two
/// infeasible vectors the smaller violation wins, and equal violations fall
/// back to Pareto dominance.
pub fn constrained_dominance(a: &[f64], va: f64, b: &[f64], vb: f64) -> Dominance {
    let (fa, fb) = (va <= 0.0, vb <= 0.0);
    match (fa, fb) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        (false, false) if va < vb => Dominance::Left,
        (false, false) if vb < va => Dominance::Right,
        _ => dominance(a, b),
    }
}

/// Fast non-dominated sorting.
///
/// # Complexity
/// O(m·n²) for n vectors of m objectives.
///
/// # Example
///
/// ```
/// use u_siteplan::pareto::non_dominated_sort;
///
/// let objectives = vec![
///     vec![1.0, 5.0],
///     vec![3.0, 3.0],
///     vec![5.0, 1.0],
///     vec![4.0, 4.0], // dominated by (3, 3)
/// ];
/// let result = non_dominated_sort(&objectives);
/// assert_eq!(result.ranks, vec![0, 0, 0, 1]);
/// ```
pub fn non_dominated_sort(objectives: &[Vec<f64>]) -> NondominatedSortResult {
    sort_by_relation(objectives.len(), |i, j| {
        dominance(&objectives[i], &objectives[j])
    })
}

/// Non-dominated sorting under [`constrained_dominance`].
///
/// Every front is either entirely feasible or entirely infeasible with one
/// shared violation value, so members of a front never dominate each other
/// in plain Pareto terms either.
///
/// # Panics
/// Panics if the slices have different lengths.
pub fn constrained_non_dominated_sort(
    objectives: &[Vec<f64>],
    violations: &[f64],
) -> NondominatedSortResult {
    assert_eq!(
        objectives.len(),
        violations.len(),
        "one violation per objective vector"
    );
    sort_by_relation(objectives.len(), |i, j| {
        constrained_dominance(&objectives[i], violations[i], &objectives[j], violations[j])
    })
}

fn sort_by_relation<F>(n: usize, relation: F) -> NondominatedSortResult
where
    F: Fn(usize, usize) -> Dominance,
{
    if n == 0 {
        return NondominatedSortResult::default();
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];
    let mut current = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            match relation(i, j) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }
        // all pairs involving i have been visited at this point
        if domination_count[i] == 0 {
            current.push(i);
        }
    }

    let mut fronts = Vec::new();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len() + 1;
                    next.push(j);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }

    NondominatedSortResult { ranks, fronts }
}

/// Crowding distance of each vector within one front.
///
/// Boundary vectors (min or max of any objective) get `f64::INFINITY`;
/// objectives with zero range contribute nothing.
///
/// # Complexity
/// O(m·n·log n).
pub fn crowding_distance(objectives: &[Vec<f64>]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].len();
    let mut distances = vec![0.0f64; n];
    let mut indices: Vec<usize> = (0..n).collect();

    for k in 0..m {
        indices.sort_by(|&a, &b| {
            objectives[a][k]
                .partial_cmp(&objectives[b][k])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let range = objectives[indices[n - 1]][k] - objectives[indices[0]][k];
        if range > 0.0 {
            for w in indices.windows(3) {
                distances[w[1]] += (objectives[w[2]][k] - objectives[w[0]][k]) / range;
            }
        }
    }

    distances
}
