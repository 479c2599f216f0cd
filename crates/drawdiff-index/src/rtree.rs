//! Static R-tree bulk loaded with Sort-Tile-Recursive packing.
//!
//! The tree is built once from a complete set of boxes and never mutated,
//! which is all a single comparison needs. Nodes live in one flat arena and
//! refer to their children by index.

use drawdiff_math::Aabb2;

/// Maximum number of children per node.
pub const NODE_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
enum Children<T> {
    Leaf(Vec<(Aabb2, T)>),
    Internal(Vec<usize>),
}

#[derive(Debug, Clone)]
struct Node<T> {
    envelope: Aabb2,
    children: Children<T>,
}

/// A packed, read-only R-tree mapping boxes to payloads.
#[derive(Debug, Clone)]
pub struct PackedRTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<usize>,
    len: usize,
    height: usize,
}

impl<T: Copy> PackedRTree<T> {
    pub fn bulk_load(entries: Vec<(Aabb2, T)>) -> Self {
        let len = entries.len();
        if entries.is_empty() {
            return Self {
                nodes: Vec::new(),
                root: None,
                len: 0,
                height: 0,
            };
        }

        let mut nodes = Vec::new();
        let mut level: Vec<usize> = str_partition(entries, |e| e.0)
            .into_iter()
            .map(|group| {
                let envelope = envelope_of(group.iter().map(|e| e.0));
                nodes.push(Node {
                    envelope,
                    children: Children::Leaf(group),
                });
                nodes.len() - 1
            })
            .collect();
        let mut height = 1;

        while level.len() > 1 {
            let groups = str_partition(level, |&i| nodes[i].envelope);
            level = groups
                .into_iter()
                .map(|group| {
                    let envelope = envelope_of(group.iter().map(|&i| nodes[i].envelope));
                    nodes.push(Node {
                        envelope,
                        children: Children::Internal(group),
                    });
                    nodes.len() - 1
                })
                .collect();
            height += 1;
        }

        Self {
            root: level.first().copied(),
            nodes,
            len,
            height,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of node levels, 0 for an empty tree.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Payloads of every entry whose box intersects `query`.
    pub fn query(&self, query: &Aabb2) -> Vec<T> {
        let mut out = Vec::new();
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.envelope.intersects(query) {
                continue;
            }
            match &node.children {
                Children::Leaf(entries) => out.extend(
                    entries
                        .iter()
                        .filter(|(bbox, _)| bbox.intersects(query))
                        .map(|&(_, item)| item),
                ),
                Children::Internal(children) => stack.extend(children.iter().copied()),
            }
        }
        out
    }
}

fn envelope_of(mut boxes: impl Iterator<Item = Aabb2>) -> Aabb2 {
    let first = boxes
        .next()
        .unwrap_or_else(|| Aabb2::from_point(Default::default()));
    boxes.fold(first, |acc, b| acc.merge(&b))
}

/// Split `items` into groups of at most [`NODE_CAPACITY`]: sort by centre x,
/// cut into vertical slices, then sort each slice by centre y and tile it.
fn str_partition<I: Copy>(mut items: Vec<I>, bbox: impl Fn(&I) -> Aabb2) -> Vec<Vec<I>> {
    let leaf_count = items.len().div_ceil(NODE_CAPACITY);
    let slice_count = (leaf_count as f64).sqrt().ceil().max(1.0) as usize;
    let slice_len = slice_count * NODE_CAPACITY;

    items.sort_by(|a, b| bbox(a).center().x.total_cmp(&bbox(b).center().x));

    let mut groups = Vec::with_capacity(leaf_count);
    for slice in items.chunks_mut(slice_len) {
        slice.sort_by(|a, b| bbox(a).center().y.total_cmp(&bbox(b).center().y));
        groups.extend(slice.chunks(NODE_CAPACITY).map(|c| c.to_vec()));
    }
    groups
}
