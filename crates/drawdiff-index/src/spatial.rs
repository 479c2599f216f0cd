use drawdiff_core::traits::BoundingBox;
use drawdiff_core::PrimitiveRef;
use drawdiff_geometry::Primitive;
use drawdiff_math::{Aabb2, Point2};
use tracing::debug;

use crate::rtree::PackedRTree;

/// Bounding-box index over one primitive collection.
///
/// Results are [`PrimitiveRef`]s into the slice the index was built from.
/// Primitives with a non-finite coordinate are left out and never returned
/// by any query.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: PackedRTree<PrimitiveRef>,
    boxes: Vec<Aabb2>,
}

impl SpatialIndex {
    pub fn build<'a>(primitives: impl IntoIterator<Item = &'a Primitive>) -> Self {
        let mut boxes = Vec::new();
        let mut entries = Vec::new();
        for (i, p) in primitives.into_iter().enumerate() {
            // f64::min drops NaN, so the box alone can look finite
            let bbox = p.bounding_box();
            if p.is_finite() && bbox.is_finite() {
                entries.push((bbox, PrimitiveRef::new(i)));
            }
            boxes.push(bbox);
        }
        let skipped = boxes.len() - entries.len();
        let tree = PackedRTree::bulk_load(entries);
        debug!(
            indexed = tree.len(),
            skipped,
            height = tree.height(),
            "built spatial index"
        );
        Self { tree, boxes }
    }

    /// Number of primitives the index was built from, indexed or not.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Bounding box computed for `r` at build time.
    pub fn bbox(&self, r: PrimitiveRef) -> Option<&Aabb2> {
        self.boxes.get(r.index())
    }

    /// Primitives whose box lies within `tolerance` of `query`'s box.
    ///
    /// The order of the result is unspecified.
    pub fn query_nearby(&self, query: &Primitive, tolerance: f64) -> Vec<PrimitiveRef> {
        self.query_bbox(&query.bounding_box().expand(tolerance))
    }

    /// Primitives whose box intersects `bbox`.
    pub fn query_bbox(&self, bbox: &Aabb2) -> Vec<PrimitiveRef> {
        self.tree.query(bbox)
    }

    /// Primitives whose box comes within `tolerance` of `point`, per axis.
    pub fn query_point(&self, point: Point2, tolerance: f64) -> Vec<PrimitiveRef> {
        self.query_bbox(&Aabb2::around(point, tolerance))
    }
}
