//! Violation magnitudes per constraint category.

use super::config::{ConstraintSettings, ConstraintWeights, MALFORMED_PENALTY};
use crate::error::EvaluationError;
use crate::layout::{Footprint, Site};
use crate::spatial::SpatialIndex;
use geo::{Area, BooleanOps, EuclideanDistance, Intersects, Line, Point, Polygon};
use std::sync::Arc;

/// External building-code check folded into the `compliance` category.
///
/// Returns a non-negative violation magnitude; zero means compliant.
/// Closures of the matching signature implement this trait.
pub trait ComplianceCheck: Send + Sync {
    fn name(&self) -> &str {
        "compliance"
    }

    fn validate(&self, footprints: &[Footprint]) -> Result<f64, EvaluationError>;
}

impl<F> ComplianceCheck for F
where
    F: Fn(&[Footprint]) -> Result<f64, EvaluationError> + Send + Sync,
{
    fn validate(&self, footprints: &[Footprint]) -> Result<f64, EvaluationError> {
        self(footprints)
    }
}

/// Unweighted violation magnitude for each category.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintBreakdown {
    /// Summed exit distance of outside vertices plus footprint area outside
    /// the site.
    pub boundary: f64,
    /// Summed pairwise intersection area.
    pub overlap: f64,
    /// Number of pairs with positive intersection area.
    pub overlap_pairs: usize,
    /// Summed clearance shortfall against the boundary and roads.
    pub setback: f64,
    /// Summed pairwise clearance shortfall.
    pub fire_separation: f64,
    /// Summed external compliance violations.
    pub compliance: f64,
    /// Fixed penalty for footprints with unusable geometry.
    pub malformed: f64,
}

impl ConstraintBreakdown {
    /// Weighted sum of all categories.
    pub fn weighted_total(&self, weights: &ConstraintWeights) -> f64 {
        weights.boundary * self.boundary
            + weights.overlap * self.overlap
            + weights.setback * self.setback
            + weights.fire_separation * self.fire_separation
            + weights.compliance * self.compliance
            + weights.malformed * self.malformed
    }

    pub fn is_clear(&self) -> bool {
        self.boundary <= 0.0
            && self.overlap <= 0.0
            && self.setback <= 0.0
            && self.fire_separation <= 0.0
            && self.compliance <= 0.0
            && self.malformed <= 0.0
    }
}

/// Computes constraint violations for a set of footprints.
#[derive(Clone, Default)]
pub struct ConstraintEvaluator {
    settings: ConstraintSettings,
    compliance: Vec<Arc<dyn ComplianceCheck>>,
}

impl std::fmt::Debug for ConstraintEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintEvaluator")
            .field("settings", &self.settings)
            .field("compliance_checks", &self.compliance.len())
            .finish()
    }
}

impl ConstraintEvaluator {
    pub fn new(settings: ConstraintSettings) -> Self {
        Self {
            settings,
            compliance: Vec::new(),
        }
    }

    pub fn with_compliance(mut self, check: Arc<dyn ComplianceCheck>) -> Self {
        self.compliance.push(check);
        self
    }

    pub fn settings(&self) -> &ConstraintSettings {
        &self.settings
    }

    /// Per-category violations.
    ///
    /// Malformed footprints are charged [`MALFORMED_PENALTY`] each and left
    /// out of every geometric category. Only compliance checks can fail.
    pub fn evaluate(
        &self,
        footprints: &[Footprint],
        site: &Site,
    ) -> Result<ConstraintBreakdown, EvaluationError> {
        let mut breakdown = ConstraintBreakdown::default();

        let valid: Vec<bool> = footprints.iter().map(is_well_formed).collect();
        breakdown.malformed =
            valid.iter().filter(|&&ok| !ok).count() as f64 * MALFORMED_PENALTY;

        // Malformed entries get no envelope and never appear in the index.
        let usable: Vec<Footprint> = footprints
            .iter()
            .zip(&valid)
            .map(|(fp, &ok)| {
                if ok {
                    fp.clone()
                } else {
                    degenerate(fp)
                }
            })
            .collect();
        let index = SpatialIndex::build(&usable);

        for (fp, _) in usable.iter().zip(&valid).filter(|(_, &ok)| ok) {
            breakdown.boundary += boundary_exit(fp, site);
            breakdown.setback += self.setback_shortfall(fp, site);
        }

        for (i, j) in index.candidate_pairs(0.0) {
            let area = usable[i]
                .polygon
                .intersection(&usable[j].polygon)
                .unsigned_area();
            if area > 1e-9 {
                breakdown.overlap += area;
                breakdown.overlap_pairs += 1;
            }
        }

        breakdown.fire_separation = self.separation_shortfall(&usable, &valid, &index);

        for check in &self.compliance {
            let value = check.validate(footprints)?;
            if !value.is_finite() {
                return Err(EvaluationError::NonFinite {
                    name: check.name().to_string(),
                    value,
                });
            }
            breakdown.compliance += value.max(0.0);
        }

        Ok(breakdown)
    }

    /// Per-category violations and their weighted total.
    pub fn evaluate_total(
        &self,
        footprints: &[Footprint],
        site: &Site,
    ) -> Result<(ConstraintBreakdown, f64), EvaluationError> {
        let breakdown = self.evaluate(footprints, site)?;
        let total = breakdown.weighted_total(&self.settings.weights);
        Ok((breakdown, total))
    }

    fn setback_shortfall(&self, fp: &Footprint, site: &Site) -> f64 {
        let mut shortfall = 0.0;
        if self.settings.min_setback > 0.0 {
            let boundary = site.boundary();
            let clearance = std::iter::once(boundary.exterior())
                .chain(boundary.interiors())
                .map(|ring| fp.polygon.exterior().euclidean_distance(ring))
                .fold(f64::INFINITY, f64::min);
            shortfall += (self.settings.min_setback - clearance).max(0.0);
        }
        if self.settings.road_setback > 0.0 {
            for road in site.roads() {
                let clearance = fp.polygon.euclidean_distance(road);
                shortfall += (self.settings.road_setback - clearance).max(0.0);
            }
        }
        shortfall
    }

    fn separation_shortfall(
        &self,
        footprints: &[Footprint],
        valid: &[bool],
        index: &SpatialIndex,
    ) -> f64 {
        let s = &self.settings;
        let tallest = footprints
            .iter()
            .zip(valid)
            .filter(|(_, &ok)| ok)
            .map(|(fp, _)| fp.height)
            .fold(0.0, f64::max);
        let widest_requirement = s.min_fire_separation.max(s.fire_height_factor * tallest);
        if widest_requirement <= 0.0 {
            return 0.0;
        }

        index
            .candidate_pairs(widest_requirement)
            .into_iter()
            .map(|(i, j)| {
                let (a, b) = (&footprints[i], &footprints[j]);
                let required = s
                    .min_fire_separation
                    .max(s.fire_height_factor * a.height.max(b.height));
                let gap = a.polygon.euclidean_distance(&b.polygon);
                (required - gap).max(0.0)
            })
            .sum()
    }
}

/// Distance by which footprint vertices leave the site, plus the area left
/// outside it.
///
/// On a concave site a footprint can cross a notch with all corners inside,
/// so the vertex term alone reads zero there.
fn boundary_exit(fp: &Footprint, site: &Site) -> f64 {
    let ring = &fp.polygon.exterior().0;
    // The ring is closed; skip the repeated last vertex.
    let vertices: f64 = ring[..ring.len().saturating_sub(1)]
        .iter()
        .map(|c| Point::from(*c).euclidean_distance(site.boundary()))
        .sum();
    let outside = fp.polygon.difference(site.boundary()).unsigned_area();
    if outside > 1e-9 {
        vertices + outside
    } else {
        vertices
    }
}

/// Finite coordinates, positive area, and a simple exterior ring.
fn is_well_formed(fp: &Footprint) -> bool {
    fp.is_finite() && fp.polygon.unsigned_area() > f64::EPSILON && !self_intersects(&fp.polygon)
}

fn self_intersects(polygon: &Polygon<f64>) -> bool {
    let lines: Vec<Line<f64>> = polygon.exterior().lines().collect();
    let n = lines.len();
    for i in 0..n {
        for j in (i + 2)..n {
            // first and last edges share the closing vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            if lines[i].intersects(&lines[j]) {
                return true;
            }
        }
    }
    false
}

/// Placeholder with non-finite geometry, dropped by the spatial index.
fn degenerate(fp: &Footprint) -> Footprint {
    let mut copy = fp.clone();
    copy.polygon = Polygon::new(
        geo::LineString::from(vec![(f64::NAN, f64::NAN); 4]),
        vec![],
    );
    copy
}
