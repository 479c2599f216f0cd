//! Top-level comparison entry points and aggregate statistics.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use drawdiff_core::{DiffError, Result, ToleranceProfile};
use drawdiff_geometry::{Primitive, PrimitiveKind};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diff::{detect_differences, Difference, DifferenceKind, Modification};
use crate::matcher::{MatchOptions, Matcher};
use crate::result::MatchResult;

/// Counts for one primitive kind. `modified + unchanged == matched`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    pub matched: usize,
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub count_a: usize,
    pub count_b: usize,
    pub matched: usize,
    pub added: usize,
    pub deleted: usize,
    /// Matched pairs that are not identical.
    pub modified: usize,
    pub unchanged: usize,
    /// `matched + added + deleted`.
    pub total: usize,
    /// `matched / total`, 1.0 for two empty drawings.
    pub overall_similarity: f64,
    /// `matched / max(count_a, count_b)`, 0 when both are empty.
    pub match_rate: f64,
    /// `(added + deleted) / max(count_a, count_b)`, 0 when both are empty.
    pub change_rate: f64,
    /// Mean similarity over matched pairs, 0 when nothing matched.
    pub average_similarity: f64,
    pub by_kind: BTreeMap<PrimitiveKind, KindStats>,
    /// Number of modified pairs raising each flag. A pair can raise several.
    pub modifications: BTreeMap<Modification, usize>,
    pub elapsed: Duration,
}

impl ComparisonSummary {
    pub fn new(
        a: &[Primitive],
        b: &[Primitive],
        result: &MatchResult,
        differences: &[Difference],
        elapsed: Duration,
    ) -> Self {
        let matched = result.matched.len();
        let added = result.added.len();
        let deleted = result.deleted.len();
        let total = matched + added + deleted;
        let larger = a.len().max(b.len());

        let ratio = |num: usize, den: usize, empty: f64| {
            if den == 0 {
                empty
            } else {
                num as f64 / den as f64
            }
        };

        let average_similarity = if matched == 0 {
            0.0
        } else {
            result.matched.iter().map(|p| p.similarity).sum::<f64>() / matched as f64
        };

        let count = |kind: DifferenceKind| differences.iter().filter(|d| d.kind == kind).count();

        let mut by_kind: BTreeMap<PrimitiveKind, KindStats> = BTreeMap::new();
        let kind_at = |prims: &[Primitive], i: usize| prims.get(i).map(Primitive::kind);
        for pair in &result.matched {
            if let Some(kind) = kind_at(a, pair.a.index()) {
                by_kind.entry(kind).or_default().matched += 1;
            }
        }
        for r in &result.deleted {
            if let Some(kind) = kind_at(a, r.index()) {
                by_kind.entry(kind).or_default().deleted += 1;
            }
        }
        for r in &result.added {
            if let Some(kind) = kind_at(b, r.index()) {
                by_kind.entry(kind).or_default().added += 1;
            }
        }

        let mut modifications: BTreeMap<Modification, usize> = BTreeMap::new();
        for d in differences {
            let Some(kind) = d.a.and_then(|r| kind_at(a, r.index())) else {
                continue;
            };
            match d.kind {
                DifferenceKind::Modified => by_kind.entry(kind).or_default().modified += 1,
                DifferenceKind::Unchanged => by_kind.entry(kind).or_default().unchanged += 1,
                DifferenceKind::Added | DifferenceKind::Deleted => {}
            }
            for &m in &d.modifications {
                *modifications.entry(m).or_default() += 1;
            }
        }

        Self {
            count_a: a.len(),
            count_b: b.len(),
            matched,
            added,
            deleted,
            modified: count(DifferenceKind::Modified),
            unchanged: count(DifferenceKind::Unchanged),
            total,
            overall_similarity: ratio(matched, total, 1.0),
            match_rate: ratio(matched, larger, 0.0),
            change_rate: ratio(added + deleted, larger, 0.0),
            average_similarity,
            by_kind,
            modifications,
            elapsed,
        }
    }

    /// Whether the two drawings have no added, deleted or modified primitive.
    pub fn is_identical(&self) -> bool {
        self.added == 0 && self.deleted == 0 && self.modified == 0
    }
}

/// Full outcome of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub result: MatchResult,
    pub summary: ComparisonSummary,
    pub differences: Vec<Difference>,
}

impl Comparison {
    pub(crate) fn assemble(
        a: &[Primitive],
        b: &[Primitive],
        result: MatchResult,
        tolerance: &ToleranceProfile,
        started: Instant,
    ) -> Self {
        let differences = detect_differences(a, b, &result, tolerance);
        let summary = ComparisonSummary::new(a, b, &result, &differences, started.elapsed());
        info!(
            matched = summary.matched,
            added = summary.added,
            deleted = summary.deleted,
            modified = summary.modified,
            overall_similarity = summary.overall_similarity,
            elapsed_ms = summary.elapsed.as_secs_f64() * 1000.0,
            "comparison finished"
        );
        Self {
            result,
            summary,
            differences,
        }
    }

    /// Pretty-printed JSON for reporting.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(DiffError::from)
    }

    /// Entries whose kind is anything but [`DifferenceKind::Unchanged`].
    pub fn changes(&self) -> impl Iterator<Item = &Difference> + '_ {
        self.differences.iter().filter(|d| d.is_change())
    }
}

/// Compare two drawings under `tolerance` with greedy matching.
pub fn compare(
    a: &[Primitive],
    b: &[Primitive],
    tolerance: &ToleranceProfile,
) -> ComparisonSummary {
    compare_with(a, b, tolerance, MatchOptions::default()).summary
}

#[tracing::instrument(skip_all, fields(count_a = a.len(), count_b = b.len()))]
pub fn compare_with(
    a: &[Primitive],
    b: &[Primitive],
    tolerance: &ToleranceProfile,
    options: MatchOptions,
) -> Comparison {
    let started = Instant::now();
    let result = Matcher::with_options(tolerance, options).match_primitives(a, b);
    Comparison::assemble(a, b, result, tolerance, started)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use drawdiff_geometry::{Circle, Line, Text};
    use drawdiff_math::dvec2;

    #[test]
    fn test_empty_drawings_are_identical() {
        let summary = compare(&[], &[], &ToleranceProfile::standard());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.overall_similarity, 1.0);
        assert_eq!(summary.match_rate, 0.0);
        assert_eq!(summary.change_rate, 0.0);
        assert_eq!(summary.average_similarity, 0.0);
        assert!(summary.by_kind.is_empty());
        assert!(summary.is_identical());
    }

    #[test]
    fn test_ratios() {
        let tol = ToleranceProfile::standard();
        let a: Vec<Primitive> = vec![
            Line::new(dvec2(0.0, 0.0), dvec2(10.0, 0.0)).into(),
            Circle::new(dvec2(50.0, 50.0), 3.0).into(),
        ];
        let b: Vec<Primitive> = vec![
            Line::new(dvec2(0.0, 0.0), dvec2(10.0, 0.0)).into(),
            Text::new(dvec2(-20.0, 0.0), "NOTE 1", 3.5).into(),
            Text::new(dvec2(-20.0, 10.0), "NOTE 2", 3.5).into(),
        ];
        let summary = compare(&a, &b, &tol);
        assert_eq!((summary.matched, summary.added, summary.deleted), (1, 2, 1));
        assert_eq!(summary.total, 4);
        assert_relative_eq!(summary.overall_similarity, 0.25);
        assert_relative_eq!(summary.match_rate, 1.0 / 3.0);
        assert_relative_eq!(summary.change_rate, 1.0);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(
            summary.by_kind[&PrimitiveKind::Text],
            KindStats {
                added: 2,
                ..KindStats::default()
            }
        );
        assert_eq!(summary.by_kind[&PrimitiveKind::Circle].deleted, 1);
        assert_eq!(summary.by_kind[&PrimitiveKind::Line].matched, 1);
        assert_eq!(summary.by_kind[&PrimitiveKind::Line].unchanged, 1);
        assert!(summary.modifications.is_empty());
    }

    #[test]
    fn test_modification_counts() {
        let tol = ToleranceProfile::standard();
        let a: Vec<Primitive> = vec![
            Line::new(dvec2(0.0, 0.0), dvec2(10.0, 0.0)).into(),
            Circle::new(dvec2(50.0, 0.0), 5.0).into(),
            Circle::new(dvec2(80.0, 0.0), 5.0).into(),
        ];
        let b: Vec<Primitive> = vec![
            Line::new(dvec2(0.0, 0.0), dvec2(10.0, 0.0)).with_color("red").into(),
            Circle::new(dvec2(50.02, 0.0), 5.0).with_color("red").into(),
            Circle::new(dvec2(80.0, 0.0), 5.0).into(),
        ];
        let summary = compare(&a, &b, &tol);
        assert_eq!(summary.modified, 2);
        assert_eq!(summary.modifications[&Modification::Attribute], 2);
        assert!(!summary.modifications.contains_key(&Modification::Position));
        assert_eq!(
            summary.by_kind[&PrimitiveKind::Circle],
            KindStats {
                matched: 2,
                modified: 1,
                unchanged: 1,
                ..KindStats::default()
            }
        );
        assert_eq!(summary.by_kind[&PrimitiveKind::Line].modified, 1);
    }

    #[test]
    fn test_comparison_json_export() {
        let tol = ToleranceProfile::standard();
        let a: Vec<Primitive> = vec![Circle::new(dvec2(0.0, 0.0), 5.0).into()];
        let b: Vec<Primitive> = vec![Circle::new(dvec2(0.02, 0.0), 5.0).into()];
        let comparison = compare_with(&a, &b, &tol, MatchOptions::default());
        assert_eq!(comparison.summary.modified, 1);
        assert_eq!(comparison.changes().count(), 1);

        let json: serde_json::Value = serde_json::from_str(&comparison.to_json().unwrap()).unwrap();
        assert_eq!(json["summary"]["matched"], 1);
        assert_eq!(json["summary"]["by_kind"]["circle"]["matched"], 1);
        assert_eq!(json["summary"]["by_kind"]["circle"]["modified"], 1);
        assert_eq!(json["result"]["matched"][0]["a"], 0);
        assert_eq!(json["differences"][0]["kind"], "modified");
    }
}
