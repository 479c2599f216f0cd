use crate::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box in the drawing plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb2 {
    pub min: Point2,
    pub max: Point2,
}

impl Aabb2 {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// A zero-area box at `p`.
    pub fn from_point(p: Point2) -> Self {
        Self { min: p, max: p }
    }

    /// Square box of half-size `half_extent` around `center`.
    pub fn around(center: Point2, half_extent: f64) -> Self {
        let offset = Vector2::splat(half_extent);
        Self {
            min: center - offset,
            max: center + offset,
        }
    }

    pub fn from_points(points: &[Point2]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min = points[0];
        let mut max = points[0];
        for &p in &points[1..] {
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self { min, max })
    }

    pub fn center(&self) -> Point2 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vector2 {
        self.max - self.min
    }

    pub fn area(&self) -> f64 {
        let e = self.extents();
        e.x * e.y
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn contains_point(&self, p: Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Closed-interval overlap test; touching boxes intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn expand(&self, amount: f64) -> Self {
        let offset = Vector2::splat(amount);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }
}
