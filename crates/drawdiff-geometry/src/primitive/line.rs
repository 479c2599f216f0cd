//! Line segment primitive.

use drawdiff_core::traits::BoundingBox;
use drawdiff_math::{Aabb2, Point2, Vector2};
use serde::{Deserialize, Serialize};

use super::{default_color, default_style};

/// A straight segment from `start` to `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point2,
    pub end: Point2,
    #[serde(default)]
    pub layer: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_style")]
    pub style: String,
}

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            layer: String::new(),
            color: default_color(),
            style: default_style(),
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Direction of travel from `start` to `end`, in `[-π, π]`.
    pub fn angle(&self) -> f64 {
        let d = self.end - self.start;
        d.y.atan2(d.x)
    }

    pub fn midpoint(&self) -> Point2 {
        (self.start + self.end) * 0.5
    }

    /// Unit direction vector; zero for a degenerate segment.
    pub fn direction(&self) -> Vector2 {
        (self.end - self.start).normalize_or_zero()
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

impl BoundingBox for Line {
    type Box = Aabb2;

    fn bounding_box(&self) -> Aabb2 {
        Aabb2::new(self.start.min(self.end), self.start.max(self.end))
    }
}
