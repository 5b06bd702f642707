//! Site boundary and road geometry.

use crate::error::SiteError;
use geo::{Area, BoundingRect, LineString, Polygon, Rect};

/// Supplier of site geometry (mapping service, road generator, fixtures).
///
/// Implementations must be pure: the optimizer reads them once per run.
pub trait SiteSource {
    /// The buildable site boundary.
    fn boundary(&self) -> Polygon<f64>;

    /// Road centre lines. Defaults to no roads.
    fn road_geometries(&self) -> Vec<LineString<f64>> {
        Vec::new()
    }
}

/// Validated, immutable site geometry.
#[derive(Debug, Clone)]
pub struct Site {
    boundary: Polygon<f64>,
    roads: Vec<LineString<f64>>,
    bounds: Rect<f64>,
}

impl Site {
    /// Validates the boundary and stores the site.
    ///
    /// Roads with non-finite coordinates or fewer than two points are
    /// dropped with a warning; the boundary itself must be usable.
    pub fn new(boundary: Polygon<f64>, roads: Vec<LineString<f64>>) -> Result<Self, SiteError> {
        let ring = boundary.exterior();
        if ring.coords().any(|c| !(c.x.is_finite() && c.y.is_finite())) {
            return Err(SiteError::NonFinite);
        }

        let distinct = distinct_vertices(ring);
        if distinct < 3 {
            return Err(SiteError::TooFewVertices(distinct));
        }
        if boundary.unsigned_area() <= f64::EPSILON {
            return Err(SiteError::ZeroArea);
        }
        let bounds = boundary
            .bounding_rect()
            .ok_or(SiteError::TooFewVertices(0))?;

        let total_roads = roads.len();
        let roads: Vec<LineString<f64>> = roads
            .into_iter()
            .filter(|r| r.0.len() >= 2 && r.coords().all(|c| c.x.is_finite() && c.y.is_finite()))
            .collect();
        if roads.len() < total_roads {
            log::warn!(
                "dropped {} unusable road geometries",
                total_roads - roads.len()
            );
        }

        Ok(Self {
            boundary,
            roads,
            bounds,
        })
    }

    /// Builds a site from an external collaborator.
    pub fn from_source<S: SiteSource + ?Sized>(source: &S) -> Result<Self, SiteError> {
        Self::new(source.boundary(), source.road_geometries())
    }

    /// Axis-aligned rectangular site with its lower-left corner at the origin.
    pub fn rectangle(width: f64, height: f64) -> Result<Self, SiteError> {
        let boundary = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (width, 0.0),
                (width, height),
                (0.0, height),
                (0.0, 0.0),
            ]),
            vec![],
        );
        Self::new(boundary, Vec::new())
    }

    /// Adds road geometry to an existing site.
    pub fn with_roads(self, roads: Vec<LineString<f64>>) -> Result<Self, SiteError> {
        Self::new(self.boundary, roads)
    }

    pub fn boundary(&self) -> &Polygon<f64> {
        &self.boundary
    }

    pub fn roads(&self) -> &[LineString<f64>] {
        &self.roads
    }

    /// Bounding rectangle of the boundary; random positions are drawn from it.
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Length of the bounding-rectangle diagonal, used for normalization.
    pub fn diagonal(&self) -> f64 {
        self.bounds.width().hypot(self.bounds.height())
    }

    /// Clamps a position into the bounding rectangle.
    pub fn clamp_position(&self, x: f64, y: f64) -> (f64, f64) {
        let (min, max) = (self.bounds.min(), self.bounds.max());
        (x.clamp(min.x, max.x), y.clamp(min.y, max.y))
    }
}

/// Number of distinct vertices in a ring, closing vertex included once.
fn distinct_vertices(ring: &LineString<f64>) -> usize {
    // `+ 0.0` folds negative zero into zero before sorting
    let mut coords: Vec<(f64, f64)> =
        ring.coords().map(|c| (c.x + 0.0, c.y + 0.0)).collect();
    coords.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    coords.dedup();
    coords.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture;

    impl SiteSource for Fixture {
        fn boundary(&self) -> Polygon<f64> {
            Polygon::new(
                LineString::from(vec![(0.0, 0.0), (30.0, 0.0), (0.0, 40.0)]),
                vec![],
            )
        }

        fn road_geometries(&self) -> Vec<LineString<f64>> {
            vec![
                LineString::from(vec![(0.0, -5.0), (30.0, -5.0)]),
                LineString::from(vec![(1.0, 1.0)]),
            ]
        }
    }

    #[test]
    fn test_rectangle_site() {
        let site = Site::rectangle(30.0, 40.0).unwrap();
        assert!((site.diagonal() - 50.0).abs() < 1e-12);
        assert_eq!(site.clamp_position(-3.0, 45.0), (0.0, 40.0));
        assert!(site.roads().is_empty());
    }

    #[test]
    fn test_from_source_drops_degenerate_roads() {
        let site = Site::from_source(&Fixture).unwrap();
        assert_eq!(site.roads().len(), 1);
        assert!((site.bounds().width() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_boundaries() {
        let line = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        assert_eq!(Site::new(line, vec![]).unwrap_err(), SiteError::TooFewVertices(2));

        let flat = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
            vec![],
        );
        assert_eq!(Site::new(flat, vec![]).unwrap_err(), SiteError::ZeroArea);

        let nan = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (f64::NAN, 0.0), (2.0, 2.0)]),
            vec![],
        );
        assert_eq!(Site::new(nan, vec![]).unwrap_err(), SiteError::NonFinite);
    }

    #[test]
    fn test_distinct_vertices_on_dense_ring() {
        let n = 5000;
        let circle: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                (50.0 + 40.0 * a.cos(), 50.0 + 40.0 * a.sin())
            })
            .collect();
        let ring = LineString::from(circle.clone());
        assert_eq!(distinct_vertices(&ring), n);
        assert!(Site::new(Polygon::new(ring, vec![]), vec![]).is_ok());

        let repeated = LineString::from(vec![
            (0.0, 0.0),
            (-0.0, 0.0),
            (4.0, 0.0),
            (4.0, 0.0),
            (0.0, 3.0),
        ]);
        assert_eq!(distinct_vertices(&repeated), 3);
    }
}
