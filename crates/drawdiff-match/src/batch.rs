//! Parallel fan-out over independent comparisons.
//!
//! Each task builds its own index and consumed set; inputs are shared
//! read-only between workers.

use std::collections::BTreeMap;
use std::time::Instant;

use drawdiff_core::{PrimitiveRef, ToleranceProfile};
use drawdiff_geometry::Primitive;
use rayon::prelude::*;
use tracing::debug;

use crate::compare::{compare_with, Comparison};
use crate::matcher::{MatchOptions, Matcher};
use crate::result::{MatchResult, MatchedPair};

/// One drawing revision pair.
pub type DrawingPair<'a> = (&'a [Primitive], &'a [Primitive]);

/// Compare every pair in parallel; results follow input order.
pub fn compare_batch(
    pairs: &[DrawingPair<'_>],
    tolerance: &ToleranceProfile,
    options: MatchOptions,
) -> Vec<Comparison> {
    debug!(pairs = pairs.len(), "comparing batch");
    pairs
        .par_iter()
        .map(|(a, b)| compare_with(a, b, tolerance, options))
        .collect()
}

/// Compare two drawings layer by layer in parallel.
///
/// Primitives only ever match within their own layer. The merged result
/// refers to indices into `a` and `b`.
#[tracing::instrument(skip_all, fields(count_a = a.len(), count_b = b.len()))]
pub fn compare_by_layer(
    a: &[Primitive],
    b: &[Primitive],
    tolerance: &ToleranceProfile,
    options: MatchOptions,
) -> Comparison {
    let started = Instant::now();

    let mut layers: BTreeMap<&str, (Vec<usize>, Vec<usize>)> = BTreeMap::new();
    for (i, p) in a.iter().enumerate() {
        layers.entry(p.layer()).or_default().0.push(i);
    }
    for (i, p) in b.iter().enumerate() {
        layers.entry(p.layer()).or_default().1.push(i);
    }
    debug!(layers = layers.len(), "partitioned by layer");

    let matcher = Matcher::with_options(tolerance, options);
    let pairs: Vec<MatchedPair> = layers
        .par_iter()
        .flat_map_iter(|(_, (ia, ib))| {
            let sub_a: Vec<&Primitive> = ia.iter().map(|&i| &a[i]).collect();
            let sub_b: Vec<&Primitive> = ib.iter().map(|&i| &b[i]).collect();
            let local = matcher.match_refs(&sub_a, &sub_b);
            local
                .matched
                .into_iter()
                .map(|p| {
                    MatchedPair::new(
                        PrimitiveRef::new(ia[p.a.index()]),
                        PrimitiveRef::new(ib[p.b.index()]),
                        p.similarity,
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let result = MatchResult::from_pairs(pairs, a.len(), b.len());
    Comparison::assemble(a, b, result, tolerance, started)
}
