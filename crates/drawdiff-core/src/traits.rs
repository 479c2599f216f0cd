use crate::error::Result;

/// Validate structural integrity of a geometric entity or configuration.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Compute an axis-aligned bounding box.
pub trait BoundingBox {
    type Box;
    fn bounding_box(&self) -> Self::Box;
}
