//! Primitive-level comparison of two drawing revisions.
//!
//! [`compare`] and [`compare_with`] are the entry points; [`Matcher`] exposes
//! the correspondence step on its own.

pub mod assignment;
pub mod batch;
pub mod compare;
pub mod diff;
pub mod matcher;
mod optimal;
pub mod result;
pub mod similarity;

pub use batch::{compare_batch, compare_by_layer, DrawingPair};
pub use compare::{compare, compare_with, Comparison, ComparisonSummary, KindStats};
pub use diff::{
    attribute_changes, detect_differences, AttributeChange, AttributeField, Difference,
    DifferenceKind, GeometricChanges, Modification,
};
pub use matcher::{MatchOptions, MatchStrategy, Matcher};
pub use result::{MatchKind, MatchResult, MatchedPair};
pub use similarity::similarity;
