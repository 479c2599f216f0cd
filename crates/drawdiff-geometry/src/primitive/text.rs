//! Text label primitive.

use drawdiff_core::traits::BoundingBox;
use drawdiff_math::{Aabb2, Point2};
use serde::{Deserialize, Serialize};

/// A text label anchored at `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub position: Point2,
    pub content: String,
    pub height: f64,
    /// Rotation in radians, counter-clockwise.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub layer: String,
}

impl Text {
    pub fn new(position: Point2, content: impl Into<String>, height: f64) -> Self {
        Self {
            position,
            content: content.into(),
            height,
            rotation: 0.0,
            layer: String::new(),
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.height.is_finite() && self.rotation.is_finite()
    }
}

impl BoundingBox for Text {
    type Box = Aabb2;

    /// Zero-area box at the anchor; glyph extents are unknown at this level.
    fn bounding_box(&self) -> Aabb2 {
        Aabb2::from_point(self.position)
    }
}
