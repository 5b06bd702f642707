//! Spatial index for proximity and overlap queries.
//!
//! Backed by an R*-tree (`rstar`) over axis-aligned envelopes. Points are
//! indexed as zero-size envelopes, so the same structure serves centroid
//! lookups and footprint conflict detection.
//!
//! # Complexity
//!
//! - Build: O(n log n) bulk load
//! - [`SpatialIndex::query_near`]: O(log n + k)
//! - [`SpatialIndex::candidate_pairs`]: O(n log n + k)
//!
//! Degenerate input (no items, coincident points, non-finite geometry) is
//! accepted; non-finite items are skipped and never returned.

use crate::layout::Footprint;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, RTreeObject, AABB};

type Entry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// R*-tree over item envelopes, keyed by item index.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<Entry>,
    envelopes: Vec<Option<([f64; 2], [f64; 2])>>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
            envelopes: Vec::new(),
        }
    }
}

impl SpatialIndex {
    /// Indexes footprint envelopes; item `i` is `footprints[i]`.
    pub fn build(footprints: &[Footprint]) -> Self {
        let envelopes = footprints
            .iter()
            .map(|fp| fp.envelope().map(|r| ([r.min().x, r.min().y], [r.max().x, r.max().y])))
            .collect();
        Self::from_envelopes(envelopes)
    }

    /// Indexes points; item `i` is `points[i]`.
    pub fn from_points(points: &[[f64; 2]]) -> Self {
        let envelopes = points
            .iter()
            .map(|&p| (p[0].is_finite() && p[1].is_finite()).then_some((p, p)))
            .collect();
        Self::from_envelopes(envelopes)
    }

    fn from_envelopes(envelopes: Vec<Option<([f64; 2], [f64; 2])>>) -> Self {
        let entries: Vec<Entry> = envelopes
            .iter()
            .enumerate()
            .filter_map(|(i, env)| {
                env.map(|(lo, hi)| GeomWithData::new(Rectangle::from_corners(lo, hi), i))
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            envelopes,
        }
    }

    /// Replaces the indexed geometry.
    pub fn rebuild(&mut self, footprints: &[Footprint]) {
        *self = Self::build(footprints);
    }

    /// Number of indexed (finite) items.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Items whose envelope lies within `radius` of `point`, ascending.
    pub fn query_near(&self, point: [f64; 2], radius: f64) -> Vec<usize> {
        if !(radius >= 0.0 && point[0].is_finite() && point[1].is_finite()) {
            return Vec::new();
        }
        let mut ids: Vec<usize> = self
            .tree
            .locate_within_distance(point, radius * radius)
            .map(|e| e.data)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Items whose envelope intersects the box `[min, max]`, ascending.
    pub fn query_envelope(&self, min: [f64; 2], max: [f64; 2]) -> Vec<usize> {
        let finite = min.iter().chain(max.iter()).all(|v| v.is_finite());
        if !(finite && min[0] <= max[0] && min[1] <= max[1]) {
            return Vec::new();
        }
        let aabb = AABB::from_corners(min, max);
        let mut ids: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|e| e.data)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Pairs `(i, j)`, `i < j`, whose envelopes come within `margin` of each
    /// other. A superset of the pairs whose geometry is that close.
    pub fn candidate_pairs(&self, margin: f64) -> Vec<(usize, usize)> {
        let margin = if margin.is_finite() { margin.max(0.0) } else { 0.0 };
        let mut pairs = Vec::new();
        for entry in self.tree.iter() {
            let i = entry.data;
            let env = entry.envelope();
            let (lo, hi) = (env.lower(), env.upper());
            let expanded = AABB::from_corners(
                [lo[0] - margin, lo[1] - margin],
                [hi[0] + margin, hi[1] + margin],
            );
            for other in self.tree.locate_in_envelope_intersecting(&expanded) {
                if other.data > i {
                    pairs.push((i, other.data));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Envelope of item `id`, `None` when it was skipped or out of range.
    pub fn envelope(&self, id: usize) -> Option<([f64; 2], [f64; 2])> {
        self.envelopes.get(id).copied().flatten()
    }
}
