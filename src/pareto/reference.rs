//! Das-Dennis reference directions.
//!
//! # References
//!
//! - Das & Dennis (1998), "Normal-Boundary Intersection: A New Method for
//!   Generating the Pareto Surface in Nonlinear Multicriteria Optimization
//!   Problems"
//! - Deb & Jain (2014), "An Evolutionary Many-Objective Optimization
//!   Algorithm Using Reference-Point-Based Nondominated Sorting Approach"

/// Uniformly spread points on the unit simplex, used as niche centres.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceDirections {
    points: Vec<Vec<f64>>,
    n_objectives: usize,
    divisions: usize,
}

impl ReferenceDirections {
    /// Simplex lattice with `divisions` steps per axis.
    ///
    /// Produces `C(divisions + m - 1, m - 1)` points whose coordinates are
    /// multiples of `1 / divisions` summing to one.
    ///
    /// # Panics
    /// Panics if `n_objectives` or `divisions` is zero.
    pub fn das_dennis(n_objectives: usize, divisions: usize) -> Self {
        assert!(n_objectives > 0, "need at least one objective");
        assert!(divisions > 0, "need at least one division");

        let mut points = Vec::with_capacity(lattice_size(n_objectives, divisions));
        let mut current = vec![0usize; n_objectives];
        fill(&mut current, 0, divisions, divisions, &mut points);

        Self {
            points,
            n_objectives,
            divisions,
        }
    }

    /// Lattice whose size is as close to `cap` as possible without exceeding
    /// it (one division at minimum).
    pub fn for_population(n_objectives: usize, cap: usize) -> Self {
        Self::das_dennis(n_objectives, divisions_for(n_objectives, cap))
    }

    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn n_objectives(&self) -> usize {
        self.n_objectives
    }

    pub fn divisions(&self) -> usize {
        self.divisions
    }

    /// Nearest direction to a normalized point, by perpendicular distance.
    /// Ties go to the lower direction index.
    pub fn associate(&self, point: &[f64]) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for (i, dir) in self.points.iter().enumerate() {
            let d = perpendicular_distance(point, dir);
            if d < best.1 {
                best = (i, d);
            }
        }
        best
    }
}

fn fill(current: &mut [usize], idx: usize, left: usize, divisions: usize, out: &mut Vec<Vec<f64>>) {
    if idx == current.len() - 1 {
        current[idx] = left;
        out.push(current.iter().map(|&c| c as f64 / divisions as f64).collect());
        return;
    }
    for i in 0..=left {
        current[idx] = i;
        fill(current, idx + 1, left - i, divisions, out);
    }
}

/// Number of lattice points for `m` objectives and `p` divisions.
pub fn lattice_size(m: usize, p: usize) -> usize {
    if m == 0 {
        return 0;
    }
    // C(p + m - 1, m - 1), computed incrementally to stay exact
    let k = m - 1;
    let mut result: usize = 1;
    for i in 1..=k {
        result = result.saturating_mul(p + i) / i;
    }
    result
}

/// Largest division count whose lattice does not exceed `cap`, at least 1.
pub fn divisions_for(m: usize, cap: usize) -> usize {
    if m <= 1 {
        return 1;
    }
    let mut p = 1;
    while lattice_size(m, p + 1) <= cap {
        p += 1;
    }
    p
}

/// Distance from `point` to the line through the origin along `direction`.
pub fn perpendicular_distance(point: &[f64], direction: &[f64]) -> f64 {
    let norm_sq: f64 = direction.iter().map(|d| d * d).sum();
    if norm_sq < 1e-20 {
        return f64::INFINITY;
    }
    let t = point.iter().zip(direction).map(|(p, d)| p * d).sum::<f64>() / norm_sq;
    point
        .iter()
        .zip(direction)
        .map(|(p, d)| (p - t * d).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_sizes() {
        assert_eq!(lattice_size(3, 4), 15);
        assert_eq!(lattice_size(4, 3), 20);
        assert_eq!(lattice_size(2, 5), 6);
        assert_eq!(lattice_size(1, 9), 1);
        for (m, p) in [(3, 4), (4, 3), (5, 2), (2, 7)] {
            assert_eq!(ReferenceDirections::das_dennis(m, p).len(), lattice_size(m, p));
        }
    }

    #[test]
    fn test_points_lie_on_simplex() {
        let dirs = ReferenceDirections::das_dennis(4, 3);
        for p in dirs.points() {
            assert_eq!(p.len(), 4);
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            assert!(p.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn test_divisions_for_cap() {
        // 4 objectives: p=3 gives 20, p=4 gives 35
        assert_eq!(divisions_for(4, 20), 3);
        assert_eq!(divisions_for(4, 34), 3);
        assert_eq!(divisions_for(4, 35), 4);
        // even one division exceeds a tiny cap; keep one
        assert_eq!(divisions_for(6, 2), 1);
    }

    #[test]
    fn test_perpendicular_distance() {
        assert!((perpendicular_distance(&[1.0, 1.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(perpendicular_distance(&[2.0, 2.0], &[0.5, 0.5]).abs() < 1e-12);
        assert!(perpendicular_distance(&[1.0], &[0.0]).is_infinite());
    }

    #[test]
    fn test_associate_picks_axis() {
        let dirs = ReferenceDirections::das_dennis(2, 2);
        // points: (0,1), (0.5,0.5), (1,0)
        assert_eq!(dirs.associate(&[0.9, 0.05]).0, 2);
        assert_eq!(dirs.associate(&[0.02, 0.8]).0, 0);
        assert_eq!(dirs.associate(&[0.4, 0.45]).0, 1);
    }
}
