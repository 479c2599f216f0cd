//! Spatial lookup of drawing primitives by bounding box.

pub mod rtree;
pub mod spatial;

pub use rtree::PackedRTree;
pub use spatial::SpatialIndex;
