//! Full circle primitive.

use std::f64::consts::PI;

use drawdiff_core::traits::BoundingBox;
use drawdiff_math::{Aabb2, Point2};
use serde::{Deserialize, Serialize};

use super::default_color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
    #[serde(default)]
    pub layer: String,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Circle {
    pub fn new(center: Point2, radius: f64) -> Self {
        Self {
            center,
            radius,
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

    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }

    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite()
    }
}

impl BoundingBox for Circle {
    type Box = Aabb2;

    fn bounding_box(&self) -> Aabb2 {
        Aabb2::around(self.center, self.radius.abs())
    }
}
