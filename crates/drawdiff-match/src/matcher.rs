//! One-to-one correspondence between two primitive collections.

use drawdiff_core::{PrimitiveRef, ToleranceProfile};
use drawdiff_geometry::Primitive;
use drawdiff_index::SpatialIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::optimal;
use crate::result::{MatchResult, MatchedPair};
use crate::similarity::similarity;

/// How candidate pairs are turned into a one-to-one assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Walk A in input order and take the best free candidate for each.
    #[default]
    Greedy,
    /// Maximize the total similarity over all accepted pairs.
    Optimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    pub strategy: MatchStrategy,
    /// Keep only this many spatial candidates per A primitive, nearest
    /// centre first. `None` scores every candidate.
    pub max_candidates: Option<usize>,
}

impl MatchOptions {
    pub fn optimal() -> Self {
        Self {
            strategy: MatchStrategy::Optimal,
            ..Self::default()
        }
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }
}

/// Matches A against B under one tolerance profile.
///
/// Holds no per-comparison state; the spatial index and the consumed set
/// live only for the duration of a call, so one matcher can serve many
/// comparisons, including concurrent ones.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'t> {
    tolerance: &'t ToleranceProfile,
    options: MatchOptions,
}

impl<'t> Matcher<'t> {
    pub fn new(tolerance: &'t ToleranceProfile) -> Self {
        Self::with_options(tolerance, MatchOptions::default())
    }

    pub fn with_options(tolerance: &'t ToleranceProfile, options: MatchOptions) -> Self {
        Self { tolerance, options }
    }

    pub fn tolerance(&self) -> &'t ToleranceProfile {
        self.tolerance
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn match_primitives(&self, a: &[Primitive], b: &[Primitive]) -> MatchResult {
        let a: Vec<&Primitive> = a.iter().collect();
        let b: Vec<&Primitive> = b.iter().collect();
        self.match_refs(&a, &b)
    }

    /// Same as [`Matcher::match_primitives`] over borrowed subsets; result
    /// indices refer to positions in `a` and `b`.
    #[tracing::instrument(
        skip_all,
        fields(count_a = a.len(), count_b = b.len(), strategy = ?self.options.strategy)
    )]
    pub fn match_refs(&self, a: &[&Primitive], b: &[&Primitive]) -> MatchResult {
        for (i, p) in a.iter().enumerate().filter(|(_, p)| !p.is_finite()) {
            warn!(index = i, kind = %p.kind(), "A primitive has non-finite geometry");
        }
        for (i, p) in b.iter().enumerate().filter(|(_, p)| !p.is_finite()) {
            warn!(index = i, kind = %p.kind(), "B primitive has non-finite geometry");
        }

        let index = SpatialIndex::build(b.iter().copied());
        let pairs = match self.options.strategy {
            MatchStrategy::Greedy => self.greedy(a, b, &index),
            MatchStrategy::Optimal => optimal::assign(self, a, b, &index),
        };
        let result = MatchResult::from_pairs(pairs, a.len(), b.len());
        debug!(
            matched = result.matched.len(),
            added = result.added.len(),
            deleted = result.deleted.len(),
            "matching finished"
        );
        result
    }

    fn greedy(&self, a: &[&Primitive], b: &[&Primitive], index: &SpatialIndex) -> Vec<MatchedPair> {
        let mut consumed = vec![false; b.len()];
        let mut pairs = Vec::new();
        for (i, query) in a.iter().enumerate() {
            let best = self
                .scored_candidates(query, b, index, Some(consumed.as_slice()))
                .into_iter()
                .fold(None, |best: Option<(PrimitiveRef, f64)>, (r, s)| match best {
                    Some((_, best_s)) if best_s >= s => best,
                    _ => Some((r, s)),
                });
            if let Some((r, s)) = best {
                consumed[r.index()] = true;
                trace!(a = i, b = r.index(), similarity = s, "matched");
                pairs.push(MatchedPair::new(PrimitiveRef::new(i), r, s));
            }
        }
        pairs
    }

    /// Search radius around a query primitive's box.
    pub fn search_radius(&self, query: &Primitive) -> f64 {
        match query {
            Primitive::Text(_) => self.tolerance.text_position,
            Primitive::Line(_) | Primitive::Circle(_) | Primitive::Arc(_) => {
                self.tolerance.position
            }
        }
    }

    /// Acceptable B partners of `query` with their scores, ordered by B
    /// index. Candidates flagged in `consumed` are skipped.
    pub(crate) fn scored_candidates(
        &self,
        query: &Primitive,
        b: &[&Primitive],
        index: &SpatialIndex,
        consumed: Option<&[bool]>,
    ) -> Vec<(PrimitiveRef, f64)> {
        let kind = query.kind();
        let mut refs: Vec<PrimitiveRef> = index
            .query_nearby(query, self.search_radius(query))
            .into_iter()
            .filter(|r| !consumed.is_some_and(|c| c[r.index()]))
            .filter(|r| b[r.index()].kind() == kind)
            .collect();

        if let Some(max) = self.options.max_candidates {
            if refs.len() > max {
                let center = query.center();
                refs.sort_by(|x, y| {
                    let dx = b[x.index()].center().distance(center);
                    let dy = b[y.index()].center().distance(center);
                    dx.total_cmp(&dy).then(x.cmp(y))
                });
                refs.truncate(max);
            }
        }

        let mut scored: Vec<_> = refs
            .into_iter()
            .filter_map(|r| {
                let s = similarity(query, b[r.index()], self.tolerance);
                (s > 0.0 && s >= self.tolerance.similarity_threshold).then_some((r, s))
            })
            .collect();
        scored.sort_by_key(|&(r, _)| r);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawdiff_core::ToleranceOverrides;
    use drawdiff_geometry::{Circle, Line, Text};
    use drawdiff_math::dvec2;

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Primitive {
        Line::new(dvec2(x0, y0), dvec2(x1, y1)).into()
    }

    #[test]
    fn test_greedy_prefers_best_candidate() {
        let tol = ToleranceProfile::loose();
        let a = vec![line(0.0, 0.0, 10.0, 0.0)];
        let b = vec![line(0.0, 0.1, 10.0, 0.1), line(0.0, 0.05, 10.0, 0.05)];
        let result = Matcher::new(&tol).match_primitives(&a, &b);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].b, PrimitiveRef::new(1));
        assert_eq!(result.added, vec![PrimitiveRef::new(0)]);
    }

    #[test]
    fn test_tie_goes_to_lowest_b_index() {
        let tol = ToleranceProfile::standard();
        let a = vec![line(0.0, 0.0, 10.0, 0.0)];
        let b = vec![line(0.0, 0.0, 10.0, 0.0), line(0.0, 0.0, 10.0, 0.0)];
        let result = Matcher::new(&tol).match_primitives(&a, &b);
        assert_eq!(result.matched[0].b, PrimitiveRef::new(0));
        assert_eq!(result.added, vec![PrimitiveRef::new(1)]);
    }

    #[test]
    fn test_consumed_candidates_are_skipped() {
        let tol = ToleranceProfile::standard();
        let a = vec![line(0.0, 0.0, 10.0, 0.0), line(0.0, 0.0, 10.0, 0.0)];
        let b = vec![line(0.0, 0.0, 10.0, 0.0)];
        let result = Matcher::new(&tol).match_primitives(&a, &b);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].a, PrimitiveRef::new(0));
        assert_eq!(result.deleted, vec![PrimitiveRef::new(1)]);
    }

    #[test]
    fn test_below_threshold_is_not_matched() {
        let tol = ToleranceProfile::standard();
        let a = vec![line(0.0, 0.0, 10.0, 0.0)];
        let b = vec![line(0.0, 0.09, 10.0, 0.09)];
        let result = Matcher::new(&tol).match_primitives(&a, &b);
        assert!(result.matched.is_empty());
        assert_eq!(result.deleted.len(), 1);
        assert_eq!(result.added.len(), 1);
    }

    #[test]
    fn test_text_searches_with_text_tolerance() {
        let tol = ToleranceProfile::standard();
        let a: Vec<Primitive> = vec![Text::new(dvec2(0.0, 0.0), "A1", 2.5).into()];
        let b: Vec<Primitive> = vec![Text::new(dvec2(0.15, 0.0), "A1", 2.5).into()];
        let matcher = Matcher::new(&tol);
        assert_eq!(matcher.search_radius(&a[0]), tol.text_position);
        let result = matcher.match_primitives(&a, &b);
        assert_eq!(result.matched.len(), 1);
        assert!(result.matched[0].similarity < 1.0);
    }

    #[test]
    fn test_max_candidates_keeps_nearest() {
        let tol = ToleranceProfile::custom(ToleranceOverrides {
            position: Some(5.0),
            similarity_threshold: Some(0.1),
            ..Default::default()
        });
        let a: Vec<Primitive> = vec![Circle::new(dvec2(0.0, 0.0), 1.0).into()];
        let b: Vec<Primitive> = vec![
            Circle::new(dvec2(3.0, 0.0), 1.0).into(),
            Circle::new(dvec2(1.0, 0.0), 1.0).into(),
            Circle::new(dvec2(2.0, 0.0), 1.0).into(),
        ];
        let options = MatchOptions::default().with_max_candidates(1);
        let matcher = Matcher::with_options(&tol, options);
        let index = SpatialIndex::build(&b);
        let b_refs: Vec<&Primitive> = b.iter().collect();
        let candidates = matcher.scored_candidates(&a[0], &b_refs, &index, None);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].0, PrimitiveRef::new(1));
    }

    #[test]
    fn test_nan_line_is_never_a_candidate() {
        let tol = ToleranceProfile::loose();
        let query = line(0.0, 0.0, 10.0, 0.0);
        let b = vec![line(f64::NAN, 0.0, 10.0, 0.0), line(0.0, 0.0, 10.0, 0.0)];
        let index = SpatialIndex::build(&b);
        let matcher = Matcher::new(&tol);
        let nearby = index.query_nearby(&query, matcher.search_radius(&query));
        assert_eq!(nearby, vec![PrimitiveRef::new(1)]);

        let b_refs: Vec<&Primitive> = b.iter().collect();
        let candidates = matcher.scored_candidates(&query, &b_refs, &index, None);
        assert_eq!(candidates, vec![(PrimitiveRef::new(1), 1.0)]);
    }

    #[test]
    fn test_non_finite_primitive_is_classified() {
        let tol = ToleranceProfile::standard();
        let a = vec![line(f64::NAN, 0.0, 10.0, 0.0), line(0.0, 0.0, 10.0, 0.0)];
        let b = vec![line(0.0, 0.0, 10.0, 0.0), line(f64::INFINITY, 0.0, 1.0, 0.0)];
        let result = Matcher::new(&tol).match_primitives(&a, &b);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.matched[0].a, PrimitiveRef::new(1));
        assert_eq!(result.deleted, vec![PrimitiveRef::new(0)]);
        assert_eq!(result.added, vec![PrimitiveRef::new(1)]);
    }
}
