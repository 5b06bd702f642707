//! Layout encoding.

use super::building::{BuildingArena, BuildingId, BuildingSpec};
use super::site::Site;
use rand::Rng;
use std::f64::consts::PI;

/// Placement and sizing decision for one building.
///
/// `x`/`y` locate the footprint centre, `rotation` is in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gene {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub width_scale: f64,
    pub depth_scale: f64,
    pub floor_scale: f64,
}

impl Gene {
    /// Unrotated, unscaled placement at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            width_scale: 1.0,
            depth_scale: 1.0,
            floor_scale: 1.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scales(mut self, width: f64, depth: f64, floors: f64) -> Self {
        self.width_scale = width;
        self.depth_scale = depth;
        self.floor_scale = floors;
        self
    }

    /// Draws a random gene: position inside the site bounds, any rotation,
    /// scales uniform within the building's ranges.
    pub fn random<R: Rng>(spec: &BuildingSpec, site: &Site, rng: &mut R) -> Self {
        let bounds = site.bounds();
        Self {
            x: sample(rng, bounds.min().x, bounds.max().x),
            y: sample(rng, bounds.min().y, bounds.max().y),
            rotation: rng.random_range(0.0..PI),
            width_scale: sample(rng, spec.width_scale.min, spec.width_scale.max),
            depth_scale: sample(rng, spec.depth_scale.min, spec.depth_scale.max),
            floor_scale: sample(rng, spec.floor_scale.min, spec.floor_scale.max),
        }
        .clamped(spec)
    }

    /// Brings rotation and scales into the building's allowed ranges.
    ///
    /// Rotation is folded into `[0, π)` since a rectangle is symmetric
    /// under a half turn. Positions are left untouched.
    pub fn clamped(mut self, spec: &BuildingSpec) -> Self {
        self.rotation = if self.rotation.is_finite() {
            let r = self.rotation.rem_euclid(PI);
            if r >= PI {
                0.0
            } else {
                r
            }
        } else {
            0.0
        };
        self.width_scale = spec.width_scale.clamp(self.width_scale);
        self.depth_scale = spec.depth_scale.clamp(self.depth_scale);
        self.floor_scale = spec.floor_scale.clamp(self.floor_scale);
        self
    }

    /// Whether rotation and scales are inside the allowed ranges.
    pub fn is_within(&self, spec: &BuildingSpec) -> bool {
        (0.0..PI).contains(&self.rotation)
            && spec.width_scale.contains(self.width_scale)
            && spec.depth_scale.contains(self.depth_scale)
            && spec.floor_scale.contains(self.floor_scale)
    }
}

fn sample<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

/// Ordered mapping from [`BuildingId`] to [`Gene`].
///
/// Gene `i` belongs to `BuildingId(i)`. The building set is fixed for a run;
/// operators change genes, never the set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genotype {
    genes: Vec<Gene>,
}

impl Genotype {
    /// Builds a genotype, clamping every gene into its building's ranges.
    ///
    /// # Panics
    /// Panics if `genes.len()` differs from the arena size.
    pub fn new(arena: &BuildingArena, genes: Vec<Gene>) -> Self {
        assert_eq!(
            genes.len(),
            arena.len(),
            "genotype needs exactly one gene per building"
        );
        let genes = genes
            .into_iter()
            .zip(arena.iter())
            .map(|(gene, (_, spec))| gene.clamped(spec))
            .collect();
        Self { genes }
    }

    /// Places each building unrotated and unscaled at the given centres.
    pub fn from_positions(arena: &BuildingArena, positions: &[(f64, f64)]) -> Self {
        Self::new(
            arena,
            positions.iter().map(|&(x, y)| Gene::at(x, y)).collect(),
        )
    }

    /// Uniformly random genotype.
    pub fn random<R: Rng>(arena: &BuildingArena, site: &Site, rng: &mut R) -> Self {
        Self {
            genes: arena
                .iter()
                .map(|(_, spec)| Gene::random(spec, site, rng))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn gene(&self, id: BuildingId) -> &Gene {
        &self.genes[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuildingId, &Gene)> {
        self.genes.iter().enumerate().map(|(i, g)| (BuildingId(i), g))
    }

    /// Replaces one gene, clamping it into range.
    pub(crate) fn set_gene(&mut self, arena: &BuildingArena, id: BuildingId, gene: Gene) {
        self.genes[id.0] = gene.clamped(arena.get(id));
    }

    /// Exchanges the positions of two buildings, keeping their shapes.
    pub(crate) fn swap_positions(&mut self, a: BuildingId, b: BuildingId) {
        let (ax, ay) = (self.genes[a.0].x, self.genes[a.0].y);
        self.genes[a.0].x = self.genes[b.0].x;
        self.genes[a.0].y = self.genes[b.0].y;
        self.genes[b.0].x = ax;
        self.genes[b.0].y = ay;
    }

    /// Bitwise equality, used for determinism checks and deduplication.
    pub fn bits_eq(&self, other: &Genotype) -> bool {
        self.genes.len() == other.genes.len()
            && self.genes.iter().zip(&other.genes).all(|(a, b)| {
                a.x.to_bits() == b.x.to_bits()
                    && a.y.to_bits() == b.y.to_bits()
                    && a.rotation.to_bits() == b.rotation.to_bits()
                    && a.width_scale.to_bits() == b.width_scale.to_bits()
                    && a.depth_scale.to_bits() == b.depth_scale.to_bits()
                    && a.floor_scale.to_bits() == b.floor_scale.to_bits()
            })
    }
}
