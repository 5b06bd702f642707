//! Materialization of genotypes into building footprints.

use super::building::{BuildingArena, BuildingId};
use super::genotype::Genotype;
use geo::{Coord, LineString, Polygon, Rect};
use std::sync::Arc;

/// A building placed on the site: the geometry every evaluator works on.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub building: BuildingId,
    pub kind: Arc<str>,
    /// Rotated rectangle, closed exterior ring, no holes.
    pub polygon: Polygon<f64>,
    pub center: Coord<f64>,
    pub width: f64,
    pub depth: f64,
    pub floors: u32,
    pub height: f64,
    /// Ground-floor area.
    pub area: f64,
}

impl Footprint {
    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.polygon
            .exterior()
            .coords()
            .all(|c| c.x.is_finite() && c.y.is_finite())
    }

    /// Gross floor area over all floors.
    pub fn floor_area(&self) -> f64 {
        self.area * self.floors as f64
    }

    /// Axis-aligned envelope of the polygon, `None` for non-finite geometry.
    pub fn envelope(&self) -> Option<Rect<f64>> {
        if !self.is_finite() {
            return None;
        }
        let mut coords = self.polygon.exterior().coords();
        let first = *coords.next()?;
        let (mut min, mut max) = (first, first);
        for c in coords {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        Some(Rect::new(min, max))
    }
}

/// Builds one footprint per gene.
pub fn materialize(arena: &BuildingArena, genotype: &Genotype) -> Vec<Footprint> {
    genotype
        .iter()
        .map(|(id, gene)| {
            let spec = arena.get(id);
            let width = spec.width * gene.width_scale;
            let depth = spec.depth * gene.depth_scale;
            let floors = spec.floors_for(gene.floor_scale);
            let center = Coord { x: gene.x, y: gene.y };
            Footprint {
                building: id,
                kind: Arc::clone(arena.kind(id)),
                polygon: rotated_rectangle(center, width, depth, gene.rotation),
                center,
                width,
                depth,
                floors,
                height: floors as f64 * spec.floor_height,
                area: width * depth,
            }
        })
        .collect()
}

/// Rectangle of `width × depth` centred on `center`, rotated counter-clockwise.
pub fn rotated_rectangle(
    center: Coord<f64>,
    width: f64,
    depth: f64,
    rotation: f64,
) -> Polygon<f64> {
    let (sin, cos) = rotation.sin_cos();
    let (hw, hd) = (0.5 * width, 0.5 * depth);
    let corner = |dx: f64, dy: f64| Coord {
        x: center.x + dx * cos - dy * sin,
        y: center.y + dx * sin + dy * cos,
    };
    Polygon::new(
        LineString::from(vec![
            corner(-hw, -hd),
            corner(hw, -hd),
            corner(hw, hd),
            corner(-hw, hd),
        ]),
        vec![],
    )
}
