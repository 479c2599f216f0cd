pub mod error;
pub mod id;
pub mod tolerance;
pub mod traits;

pub use error::{DiffError, Result};
pub use id::PrimitiveRef;
pub use tolerance::{Preset, ToleranceOverrides, ToleranceProfile};
