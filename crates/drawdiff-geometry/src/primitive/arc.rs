//! Circular arc primitive.

use drawdiff_core::traits::BoundingBox;
use drawdiff_math::{angle, dvec2, Aabb2, Point2};
use serde::{Deserialize, Serialize};

use super::default_color;

/// A circular arc swept counter-clockwise from `start_angle` to `end_angle`.
///
/// Angles are radians from the positive x-axis and are not normalized; use
/// [`Arc::sweep`] for the swept span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    #[serde(default)]
    pub layer: String,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Arc {
    pub fn new(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
            layer: String::new(),
            color: default_color(),
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

    /// Counter-clockwise span in `(0, 2π]`.
    pub fn sweep(&self) -> f64 {
        angle::ccw_sweep(self.start_angle, self.end_angle)
    }

    pub fn arc_length(&self) -> f64 {
        self.radius.abs() * self.sweep()
    }

    pub fn point_at_angle(&self, theta: f64) -> Point2 {
        self.center + self.radius * dvec2(theta.cos(), theta.sin())
    }

    pub fn start_point(&self) -> Point2 {
        self.point_at_angle(self.start_angle)
    }

    pub fn end_point(&self) -> Point2 {
        self.point_at_angle(self.end_angle)
    }

    pub fn is_finite(&self) -> bool {
        self.center.is_finite()
            && self.radius.is_finite()
            && self.start_angle.is_finite()
            && self.end_angle.is_finite()
    }
}

impl BoundingBox for Arc {
    type Box = Aabb2;

    /// Box of the full supporting circle. This over-approximates partial
    /// arcs, so spatial queries may return extra candidates but never miss
    /// one.
    fn bounding_box(&self) -> Aabb2 {
        Aabb2::around(self.center, self.radius.abs())
    }
}
