//! Globally optimal assignment over the candidate graph.
//!
//! Acceptable (A, B) pairs form a bipartite graph. Each connected component
//! is solved independently as a dense assignment problem with cost
//! `1 - similarity`; non-edges cost 1 so that leaving a primitive unmatched
//! is never worse than taking a forbidden pair.

use std::collections::BTreeMap;

use drawdiff_core::PrimitiveRef;
use drawdiff_geometry::Primitive;
use drawdiff_index::SpatialIndex;
use tracing::{debug, trace};

use crate::assignment::min_cost_assignment;
use crate::matcher::Matcher;
use crate::result::MatchedPair;

struct Edge {
    a: usize,
    b: usize,
    similarity: f64,
}

pub(crate) fn assign(
    matcher: &Matcher<'_>,
    a: &[&Primitive],
    b: &[&Primitive],
    index: &SpatialIndex,
) -> Vec<MatchedPair> {
    let edges: Vec<Edge> = a
        .iter()
        .enumerate()
        .flat_map(|(i, query)| {
            matcher
                .scored_candidates(query, b, index, None)
                .into_iter()
                .map(move |(r, s)| Edge {
                    a: i,
                    b: r.index(),
                    similarity: s,
                })
        })
        .collect();

    // A occupies nodes 0..a.len(), B the rest
    let mut sets = DisjointSets::new(a.len() + b.len());
    for e in &edges {
        sets.union(e.a, a.len() + e.b);
    }

    let mut components: BTreeMap<usize, Vec<&Edge>> = BTreeMap::new();
    for e in &edges {
        components.entry(sets.find(e.a)).or_default().push(e);
    }
    debug!(
        edges = edges.len(),
        components = components.len(),
        "candidate graph built"
    );

    let mut pairs = Vec::new();
    for component in components.values() {
        pairs.extend(solve_component(component));
    }
    pairs
}

fn solve_component(edges: &[&Edge]) -> Vec<MatchedPair> {
    if let [e] = edges {
        return vec![pair(e.a, e.b, e.similarity)];
    }

    let mut rows: Vec<usize> = edges.iter().map(|e| e.a).collect();
    let mut cols: Vec<usize> = edges.iter().map(|e| e.b).collect();
    rows.sort_unstable();
    rows.dedup();
    cols.sort_unstable();
    cols.dedup();

    let mut cost = vec![1.0; rows.len() * cols.len()];
    let mut score = vec![None; rows.len() * cols.len()];
    for e in edges {
        let (Ok(i), Ok(j)) = (rows.binary_search(&e.a), cols.binary_search(&e.b)) else {
            continue;
        };
        cost[i * cols.len() + j] = 1.0 - e.similarity;
        score[i * cols.len() + j] = Some(e.similarity);
    }

    trace!(rows = rows.len(), cols = cols.len(), "solving component");
    min_cost_assignment(&cost, rows.len(), cols.len())
        .into_iter()
        .enumerate()
        .filter_map(|(i, j)| {
            let j = j?;
            score[i * cols.len() + j].map(|s| pair(rows[i], cols[j], s))
        })
        .collect()
}

fn pair(a: usize, b: usize, similarity: f64) -> MatchedPair {
    MatchedPair::new(PrimitiveRef::new(a), PrimitiveRef::new(b), similarity)
}

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, x: usize, y: usize) {
        let (rx, ry) = (self.find(x), self.find(y));
        if rx != ry {
            self.parent[rx.max(ry)] = rx.min(ry);
        }
    }
}
