//! Drawing primitives extracted from one revision of an engineering drawing.

pub mod primitive;

pub use primitive::{Arc, Circle, Line, Primitive, PrimitiveKind, Text};
