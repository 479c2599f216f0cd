/// Stable position of a primitive inside the collection that owns it.
///
/// The matcher never copies primitives; every result refers back to the
/// caller's slices through these indices.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PrimitiveRef(usize);

impl PrimitiveRef {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for PrimitiveRef {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for PrimitiveRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
