//! Building definitions and the arena that owns them.
//!
//! Genotypes refer to buildings by [`BuildingId`] only. The arena is
//! immutable for the duration of a run and is shared read-only between
//! workers.

use crate::error::SiteError;
use std::sync::Arc;

/// Dense index of a building inside a [`BuildingArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingId(pub usize);

impl BuildingId {
    /// Position of this building in the arena and in every genotype.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Closed interval of allowed values for a scale gene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range that only admits `value`.
    pub fn fixed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Clamps `value` into the range. Non-finite input maps to the midpoint.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.midpoint()
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self::fixed(1.0)
    }
}

/// Immutable description of one building to be placed.
///
/// Footprint dimensions are `width × width_scale` by `depth × depth_scale`;
/// the floor count is `round(floors × floor_scale)`, never below one.
///
/// ```
/// use u_siteplan::layout::{BuildingSpec, ScaleRange};
///
/// let office = BuildingSpec::new("office-a", "office", 20.0, 12.0)
///     .with_floors(4)
///     .with_width_scale(ScaleRange::new(0.8, 1.2))
///     .with_cost_per_area(1_800.0);
/// assert_eq!(office.floors, 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildingSpec {
    pub name: String,
    /// Building type, matched by adjacency rules.
    pub kind: String,
    pub width: f64,
    pub depth: f64,
    pub floors: u32,
    pub floor_height: f64,
    /// Construction cost per square metre of gross floor area.
    pub cost_per_area: f64,
    pub width_scale: ScaleRange,
    pub depth_scale: ScaleRange,
    pub floor_scale: ScaleRange,
}

impl BuildingSpec {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, width: f64, depth: f64) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            width,
            depth,
            floors: 1,
            floor_height: 3.0,
            cost_per_area: 1.0,
            width_scale: ScaleRange::default(),
            depth_scale: ScaleRange::default(),
            floor_scale: ScaleRange::default(),
        }
    }

    pub fn with_floors(mut self, floors: u32) -> Self {
        self.floors = floors;
        self
    }

    pub fn with_floor_height(mut self, height: f64) -> Self {
        self.floor_height = height;
        self
    }

    pub fn with_cost_per_area(mut self, cost: f64) -> Self {
        self.cost_per_area = cost;
        self
    }

    pub fn with_width_scale(mut self, range: ScaleRange) -> Self {
        self.width_scale = range;
        self
    }

    pub fn with_depth_scale(mut self, range: ScaleRange) -> Self {
        self.depth_scale = range;
        self
    }

    pub fn with_floor_scale(mut self, range: ScaleRange) -> Self {
        self.floor_scale = range;
        self
    }

    /// Floor count produced by a floor-scale gene.
    pub fn floors_for(&self, floor_scale: f64) -> u32 {
        let scaled = (self.floors as f64 * floor_scale).round();
        if scaled.is_finite() && scaled >= 1.0 {
            scaled as u32
        } else {
            1
        }
    }

    /// Highest cost this building can reach with any gene.
    pub fn max_cost(&self) -> f64 {
        let area = self.width * self.width_scale.max * self.depth * self.depth_scale.max;
        area * self.floors_for(self.floor_scale.max) as f64 * self.cost_per_area
    }

    fn validate(&self) -> Result<(), SiteError> {
        let fail = |reason: &str| SiteError::InvalidBuilding {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(fail("width must be positive"));
        }
        if !(self.depth.is_finite() && self.depth > 0.0) {
            return Err(fail("depth must be positive"));
        }
        if self.floors == 0 {
            return Err(fail("floors must be at least 1"));
        }
        if !(self.floor_height.is_finite() && self.floor_height > 0.0) {
            return Err(fail("floor_height must be positive"));
        }
        if !(self.cost_per_area.is_finite() && self.cost_per_area >= 0.0) {
            return Err(fail("cost_per_area must be non-negative"));
        }
        for (label, range) in [
            ("width_scale", &self.width_scale),
            ("depth_scale", &self.depth_scale),
            ("floor_scale", &self.floor_scale),
        ] {
            if !range.is_valid() {
                return Err(fail(&format!(
                    "{label} must satisfy 0 < min <= max, got [{}, {}]",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

/// Arena of building specs indexed by [`BuildingId`].
#[derive(Debug, Clone, Default)]
pub struct BuildingArena {
    specs: Vec<BuildingSpec>,
    kinds: Vec<Arc<str>>,
}

impl BuildingArena {
    /// Validates and stores the specs. Ids are assigned in input order.
    pub fn new(specs: Vec<BuildingSpec>) -> Result<Self, SiteError> {
        for spec in &specs {
            spec.validate()?;
        }
        let kinds = specs.iter().map(|s| Arc::from(s.kind.as_str())).collect();
        Ok(Self { specs, kinds })
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// # Panics
    /// Panics if `id` does not belong to this arena.
    pub fn get(&self, id: BuildingId) -> &BuildingSpec {
        &self.specs[id.0]
    }

    pub(crate) fn kind(&self, id: BuildingId) -> &Arc<str> {
        &self.kinds[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuildingId, &BuildingSpec)> {
        self.specs.iter().enumerate().map(|(i, s)| (BuildingId(i), s))
    }

    /// Sum of [`BuildingSpec::max_cost`] over all buildings.
    pub fn max_total_cost(&self) -> f64 {
        self.specs.iter().map(BuildingSpec::max_cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floors_for_rounds_and_floors_at_one() {
        let spec = BuildingSpec::new("a", "house", 10.0, 10.0).with_floors(3);
        assert_eq!(spec.floors_for(1.0), 3);
        assert_eq!(spec.floors_for(1.5), 5);
        assert_eq!(spec.floors_for(0.01), 1);
        assert_eq!(spec.floors_for(f64::NAN), 1);
    }

    #[test]
    fn test_scale_range_clamp() {
        let range = ScaleRange::new(0.5, 2.0);
        assert_eq!(range.clamp(3.0), 2.0);
        assert_eq!(range.clamp(0.1), 0.5);
        assert_eq!(range.clamp(f64::NAN), 1.25);
        assert!(range.contains(1.0));
    }

    #[test]
    fn test_arena_rejects_bad_spec() {
        let bad = BuildingSpec::new("broken", "x", -1.0, 5.0);
        let err = BuildingArena::new(vec![bad]).unwrap_err();
        assert!(matches!(err, SiteError::InvalidBuilding { ref name, .. } if name == "broken"));

        let inverted = BuildingSpec::new("inv", "x", 5.0, 5.0)
            .with_depth_scale(ScaleRange::new(2.0, 1.0));
        assert!(BuildingArena::new(vec![inverted]).is_err());
    }

    #[test]
    fn test_max_total_cost() {
        let arena = BuildingArena::new(vec![
            BuildingSpec::new("a", "x", 10.0, 10.0)
                .with_floors(2)
                .with_cost_per_area(2.0),
            BuildingSpec::new("b", "x", 5.0, 4.0).with_width_scale(ScaleRange::new(1.0, 2.0)),
        ])
        .unwrap();
        // a: 100 m² × 2 floors × 2.0, b: 40 m² × 1 floor × 1.0
        assert!((arena.max_total_cost() - 440.0).abs() < 1e-9);
        assert_eq!(arena.iter().count(), 2);
    }
}
