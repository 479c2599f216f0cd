use drawdiff_core::PrimitiveRef;
use serde::{Deserialize, Serialize};

/// Confidence band of an accepted pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Similarity of at least 0.95.
    Exact,
    /// Similarity of at least 0.80.
    Similar,
    /// Accepted, but below 0.80.
    Partial,
}

impl MatchKind {
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity >= 0.95 {
            MatchKind::Exact
        } else if similarity >= 0.8 {
            MatchKind::Similar
        } else {
            MatchKind::Partial
        }
    }
}

/// One A primitive paired with one B primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub a: PrimitiveRef,
    pub b: PrimitiveRef,
    pub similarity: f64,
}

impl MatchedPair {
    pub fn new(a: PrimitiveRef, b: PrimitiveRef, similarity: f64) -> Self {
        Self { a, b, similarity }
    }

    pub fn kind(&self) -> MatchKind {
        MatchKind::from_similarity(self.similarity)
    }

    /// Whether the pair is geometrically identical under the profile.
    pub fn is_identical(&self) -> bool {
        self.similarity == 1.0
    }
}

/// Classification of every primitive of A and B.
///
/// `matched` is ordered by A index, `added` and `deleted` by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Vec<MatchedPair>,
    /// B primitives with no counterpart in A.
    pub added: Vec<PrimitiveRef>,
    /// A primitives with no counterpart in B.
    pub deleted: Vec<PrimitiveRef>,
}

impl MatchResult {
    /// Assemble a result from accepted pairs, deriving the leftovers.
    ///
    /// Pairs referring past `len_a` or `len_b` are dropped.
    pub fn from_pairs(mut matched: Vec<MatchedPair>, len_a: usize, len_b: usize) -> Self {
        matched.retain(|p| p.a.index() < len_a && p.b.index() < len_b);
        matched.sort_by_key(|p| p.a);
        let mut used_a = vec![false; len_a];
        let mut used_b = vec![false; len_b];
        for pair in &matched {
            used_a[pair.a.index()] = true;
            used_b[pair.b.index()] = true;
        }
        Self {
            matched,
            added: unused(&used_b),
            deleted: unused(&used_a),
        }
    }

    pub fn pairs_of(&self, kind: MatchKind) -> impl Iterator<Item = &MatchedPair> + '_ {
        self.matched.iter().filter(move |p| p.kind() == kind)
    }

    /// Pair whose A side is `a`, if any.
    pub fn partner_of_a(&self, a: PrimitiveRef) -> Option<&MatchedPair> {
        self.matched
            .binary_search_by_key(&a, |p| p.a)
            .ok()
            .map(|i| &self.matched[i])
    }

    /// Whether every A index appears exactly once across `matched` and
    /// `deleted`, and every B index exactly once across `matched` and
    /// `added`.
    pub fn is_complete_partition(&self, len_a: usize, len_b: usize) -> bool {
        let mut seen_a = vec![0u32; len_a];
        let mut seen_b = vec![0u32; len_b];
        let a_refs = self.matched.iter().map(|p| p.a).chain(self.deleted.iter().copied());
        let b_refs = self.matched.iter().map(|p| p.b).chain(self.added.iter().copied());
        for r in a_refs {
            match seen_a.get_mut(r.index()) {
                Some(n) => *n += 1,
                None => return false,
            }
        }
        for r in b_refs {
            match seen_b.get_mut(r.index()) {
                Some(n) => *n += 1,
                None => return false,
            }
        }
        seen_a.iter().chain(&seen_b).all(|&n| n == 1)
    }

    /// The same correspondence seen from B's side.
    pub fn swap(&self) -> Self {
        let mut matched: Vec<_> = self
            .matched
            .iter()
            .map(|p| MatchedPair::new(p.b, p.a, p.similarity))
            .collect();
        matched.sort_by_key(|p| p.a);
        Self {
            matched,
            added: self.deleted.clone(),
            deleted: self.added.clone(),
        }
    }
}

fn unused(used: &[bool]) -> Vec<PrimitiveRef> {
    used.iter()
        .enumerate()
        .filter(|&(_, &u)| !u)
        .map(|(i, _)| PrimitiveRef::new(i))
        .collect()
}
