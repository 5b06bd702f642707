//! Perturbation operators shared by SA and GA mutation.

use crate::layout::{BuildingArena, BuildingId, Gene, Site, Solution};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// One neighbourhood move over a layout.
///
/// Every variant returns a new, unevaluated [`Solution`] and leaves the
/// input untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Perturbation {
    /// Jitters the centre of one random building by `N(0, sigma²)` per axis.
    Gaussian { sigma: f64 },
    /// Exchanges the positions of two distinct buildings.
    Swap,
    /// Redraws every gene of one building uniformly at random.
    Reset,
}

impl Perturbation {
    /// Short name for logs and operator statistics.
    pub fn name(&self) -> &'static str {
        match self {
            Perturbation::Gaussian { .. } => "gaussian",
            Perturbation::Swap => "swap",
            Perturbation::Reset => "reset",
        }
    }

    /// Applies the move.
    ///
    /// Jittered positions are clamped into the site bounding box. A swap
    /// with fewer than two buildings, or any move on an empty layout,
    /// returns an unevaluated copy.
    pub fn apply<R: Rng>(
        &self,
        solution: &Solution,
        arena: &BuildingArena,
        site: &Site,
        rng: &mut R,
    ) -> Solution {
        let n = solution.genotype().len();
        if n == 0 {
            return solution.edited(|_| {});
        }

        match *self {
            Perturbation::Gaussian { sigma } => {
                let id = BuildingId(rng.random_range(0..n));
                let noise = match Normal::new(0.0, sigma.max(0.0)) {
                    Ok(normal) => normal,
                    Err(_) => return solution.edited(|_| {}),
                };
                let dx = noise.sample(rng);
                let dy = noise.sample(rng);
                solution.edited(|genotype| {
                    let mut gene = *genotype.gene(id);
                    let (x, y) = site.clamp_position(gene.x + dx, gene.y + dy);
                    gene.x = x;
                    gene.y = y;
                    genotype.set_gene(arena, id, gene);
                })
            }
            Perturbation::Swap => {
                if n < 2 {
                    return solution.edited(|_| {});
                }
                let a = rng.random_range(0..n);
                let mut b = rng.random_range(0..n - 1);
                if b >= a {
                    b += 1;
                }
                solution.edited(|genotype| genotype.swap_positions(BuildingId(a), BuildingId(b)))
            }
            Perturbation::Reset => {
                let id = BuildingId(rng.random_range(0..n));
                let gene = Gene::random(arena.get(id), site, rng);
                solution.edited(|genotype| genotype.set_gene(arena, id, gene))
            }
        }
    }
}

/// Selection probabilities over the [`Perturbation`] variants.
///
/// Weights need not sum to one; they are normalized on use.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperatorWeights {
    pub gaussian: f64,
    pub swap: f64,
    pub reset: f64,
}

impl OperatorWeights {
    pub fn new(gaussian: f64, swap: f64, reset: f64) -> Self {
        Self {
            gaussian,
            swap,
            reset,
        }
    }

    /// Annealing mix: mostly local jitter with occasional escapes.
    pub fn annealing() -> Self {
        Self::new(0.80, 0.15, 0.05)
    }

    /// Mutation mix of the genetic phase.
    pub fn mutation() -> Self {
        Self::new(0.70, 0.20, 0.10)
    }

    fn total(&self) -> f64 {
        self.gaussian + self.swap + self.reset
    }

    /// Draws a perturbation; `sigma` parameterizes the Gaussian variant.
    pub fn choose<R: Rng>(&self, sigma: f64, rng: &mut R) -> Perturbation {
        let r = rng.random::<f64>() * self.total();
        if r < self.gaussian {
            Perturbation::Gaussian { sigma }
        } else if r < self.gaussian + self.swap {
            Perturbation::Swap
        } else {
            Perturbation::Reset
        }
    }

    /// Returns the reason the weights cannot be used.
    pub fn validate(&self) -> Result<(), String> {
        let all = [self.gaussian, self.swap, self.reset];
        if all.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(format!("weights must be finite and non-negative, got {all:?}"));
        }
        if self.total() <= 0.0 {
            return Err("at least one weight must be positive".into());
        }
        Ok(())
    }
}

impl Default for OperatorWeights {
    fn default() -> Self {
        Self::annealing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BuildingSpec, Genotype, ScaleRange};
    use crate::random::create_rng;

    fn setup(n: usize) -> (BuildingArena, Site, Solution) {
        let specs = (0..n)
            .map(|i| {
                BuildingSpec::new(format!("b{i}"), "house", 5.0, 5.0)
                    .with_width_scale(ScaleRange::new(0.5, 1.5))
            })
            .collect();
        let arena = BuildingArena::new(specs).unwrap();
        let site = Site::rectangle(50.0, 50.0).unwrap();
        let positions: Vec<(f64, f64)> = (0..n).map(|i| (5.0 + 10.0 * i as f64, 25.0)).collect();
        let genotype = Genotype::from_positions(&arena, &positions);
        (arena, site, Solution::new(genotype))
    }

    #[test]
    fn test_gaussian_moves_one_building() {
        let (arena, site, sol) = setup(3);
        let mut rng = create_rng(1);
        let moved = Perturbation::Gaussian { sigma: 2.0 }.apply(&sol, &arena, &site, &mut rng);
        let changed = sol
            .genotype()
            .genes()
            .iter()
            .zip(moved.genotype().genes())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
        assert!(!moved.is_evaluated());
    }

    #[test]
    fn test_gaussian_stays_in_bounds() {
        let (arena, site, mut sol) = setup(2);
        let mut rng = create_rng(2);
        for _ in 0..200 {
            sol = Perturbation::Gaussian { sigma: 100.0 }.apply(&sol, &arena, &site, &mut rng);
        }
        for g in sol.genotype().genes() {
            assert!((0.0..=50.0).contains(&g.x));
            assert!((0.0..=50.0).contains(&g.y));
        }
    }

    #[test]
    fn test_swap_exchanges_positions() {
        let (arena, site, sol) = setup(2);
        let mut rng = create_rng(3);
        let swapped = Perturbation::Swap.apply(&sol, &arena, &site, &mut rng);
        let (a, b) = (sol.genotype().genes(), swapped.genotype().genes());
        assert_eq!((a[0].x, a[0].y), (b[1].x, b[1].y));
        assert_eq!((a[1].x, a[1].y), (b[0].x, b[0].y));
    }

    #[test]
    fn test_swap_single_building_is_noop() {
        let (arena, site, sol) = setup(1);
        let mut rng = create_rng(4);
        let out = Perturbation::Swap.apply(&sol, &arena, &site, &mut rng);
        assert_eq!(out.genotype(), sol.genotype());
    }

    #[test]
    fn test_reset_respects_ranges() {
        let (arena, site, sol) = setup(4);
        let mut rng = create_rng(5);
        for _ in 0..50 {
            let out = Perturbation::Reset.apply(&sol, &arena, &site, &mut rng);
            for (id, gene) in out.genotype().iter() {
                assert!(gene.is_within(arena.get(id)));
            }
        }
    }

    #[test]
    fn test_choose_follows_weights() {
        let weights = OperatorWeights::annealing();
        let mut rng = create_rng(6);
        let mut counts = [0usize; 3];
        for _ in 0..10_000 {
            match weights.choose(1.0, &mut rng) {
                Perturbation::Gaussian { .. } => counts[0] += 1,
                Perturbation::Swap => counts[1] += 1,
                Perturbation::Reset => counts[2] += 1,
            }
        }
        assert!((7_500..8_500).contains(&counts[0]), "{counts:?}");
        assert!((1_200..1_800).contains(&counts[1]), "{counts:?}");
        assert!((300..700).contains(&counts[2]), "{counts:?}");
    }

    #[test]
    fn test_validate_weights() {
        assert!(OperatorWeights::mutation().validate().is_ok());
        assert!(OperatorWeights::new(0.0, 0.0, 0.0).validate().is_err());
        assert!(OperatorWeights::new(-1.0, 1.0, 0.0).validate().is_err());
    }
}
