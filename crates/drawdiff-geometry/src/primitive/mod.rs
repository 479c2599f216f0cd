//! The closed set of drawing primitives.

mod arc;
mod circle;
mod line;
mod text;

use drawdiff_core::traits::{BoundingBox, Validate};
use drawdiff_core::{DiffError, Result};
use drawdiff_math::{Aabb2, Point2};
use serde::{Deserialize, Serialize};

pub use arc::Arc;
pub use circle::Circle;
pub use line::Line;
pub use text::Text;

pub(crate) fn default_color() -> String {
    "black".to_string()
}

pub(crate) fn default_style() -> String {
    "solid".to_string()
}

/// One drawing element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    Text(Text),
}

/// Variant discriminant of a [`Primitive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Line,
    Circle,
    Arc,
    Text,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 4] = [
        PrimitiveKind::Line,
        PrimitiveKind::Circle,
        PrimitiveKind::Arc,
        PrimitiveKind::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Line => "line",
            PrimitiveKind::Circle => "circle",
            PrimitiveKind::Arc => "arc",
            PrimitiveKind::Text => "text",
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Line(_) => PrimitiveKind::Line,
            Primitive::Circle(_) => PrimitiveKind::Circle,
            Primitive::Arc(_) => PrimitiveKind::Arc,
            Primitive::Text(_) => PrimitiveKind::Text,
        }
    }

    pub fn layer(&self) -> &str {
        match self {
            Primitive::Line(l) => &l.layer,
            Primitive::Circle(c) => &c.layer,
            Primitive::Arc(a) => &a.layer,
            Primitive::Text(t) => &t.layer,
        }
    }

    /// Representative point: segment midpoint, circle/arc centre, text anchor.
    pub fn center(&self) -> Point2 {
        match self {
            Primitive::Line(l) => l.midpoint(),
            Primitive::Circle(c) => c.center,
            Primitive::Arc(a) => a.center,
            Primitive::Text(t) => t.position,
        }
    }

    /// Whether every coordinate and measure is a finite number.
    pub fn is_finite(&self) -> bool {
        match self {
            Primitive::Line(l) => l.is_finite(),
            Primitive::Circle(c) => c.is_finite(),
            Primitive::Arc(a) => a.is_finite(),
            Primitive::Text(t) => t.is_finite(),
        }
    }
}

impl BoundingBox for Primitive {
    type Box = Aabb2;

    fn bounding_box(&self) -> Aabb2 {
        match self {
            Primitive::Line(l) => l.bounding_box(),
            Primitive::Circle(c) => c.bounding_box(),
            Primitive::Arc(a) => a.bounding_box(),
            Primitive::Text(t) => t.bounding_box(),
        }
    }
}

impl Validate for Primitive {
    fn validate(&self) -> Result<()> {
        if !self.is_finite() {
            return Err(DiffError::Geometry(format!(
                "{} has non-finite geometry",
                self.kind()
            )));
        }
        match self {
            Primitive::Circle(Circle { radius, .. }) | Primitive::Arc(Arc { radius, .. })
                if *radius < 0.0 =>
            {
                Err(DiffError::Geometry(format!(
                    "{} has negative radius {radius}",
                    self.kind()
                )))
            }
            Primitive::Text(t) if t.height < 0.0 => Err(DiffError::Geometry(format!(
                "text has negative height {}",
                t.height
            ))),
            _ => Ok(()),
        }
    }
}

impl From<Line> for Primitive {
    fn from(v: Line) -> Self {
        Primitive::Line(v)
    }
}

impl From<Circle> for Primitive {
    fn from(v: Circle) -> Self {
        Primitive::Circle(v)
    }
}

impl From<Arc> for Primitive {
    fn from(v: Arc) -> Self {
        Primitive::Arc(v)
    }
}

impl From<Text> for Primitive {
    fn from(v: Text) -> Self {
        Primitive::Text(v)
    }
}
