//! Rank-augmented k-d tree.
//!
//! A static, bucketed 2D k-d tree in which every node also records the
//! smallest [`RankKey`] found anywhere in its subtree. Queries walk the tree
//! best-first by that key, so points come out in ascending rank order and the
//! walk stops as soon as enough matches have been produced.
//!
//! # Layout
//!
//! - Points live in one flat array. Each leaf owns a contiguous range of it,
//!   sorted by rank key.
//! - Internal nodes split their points at the median of the wider axis.
//! - Every node stores its bounding box, so subtrees disjoint from the query
//!   rectangle are never visited.
//!
//! # Query
//!
//! A min-heap holds two kinds of candidates: whole subtrees keyed by their
//! minimum key, and single matching points keyed by their own key. A leaf
//! contributes only its first matching point; the next one is pushed when the
//! previous one is emitted. A point popped off the heap is therefore always
//! the lowest-ranked remaining match.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::geometry::{RankKey, RankedPoint, Rect};

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    /// Points `start..end` of the flat array, sorted by key.
    Leaf { start: usize, end: usize },
    /// Child node indices.
    Branch { left: usize, right: usize },
}

#[derive(Debug, Clone)]
struct KdNode {
    bounds: Rect,
    min_key: RankKey,
    kind: NodeKind,
}

/// Heap entry payload. Ordered only to break exact key ties, which cannot
/// occur between a subtree and a point outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Candidate {
    Node(usize),
    Point { index: usize, leaf_end: usize },
}

type CandidateHeap = BinaryHeap<Reverse<(RankKey, Candidate)>>;

/// Static k-d tree answering "lowest ranks inside a rectangle" queries.
#[derive(Debug, Clone)]
pub struct RankedKdTree {
    nodes: Vec<KdNode>,
    points: Vec<RankedPoint>,
    root: Option<usize>,
}

impl RankedKdTree {
    /// Build the tree, taking ownership of the points.
    ///
    /// `leaf_size` is the maximum number of points per leaf; zero is treated
    /// as one.
    pub fn build(mut points: Vec<RankedPoint>, leaf_size: usize) -> Self {
        let leaf_size = leaf_size.max(1);
        let mut nodes = Vec::with_capacity(2 * points.len().div_ceil(leaf_size));
        let root = if points.is_empty() {
            None
        } else {
            Some(build_node(&mut nodes, &mut points, 0, leaf_size))
        };

        Self {
            nodes,
            points,
            root,
        }
    }

    /// Number of points stored.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of tree nodes, leaves included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bounding box of every stored point, or None when empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.root.map(|root| self.nodes[root].bounds)
    }

    /// Emit up to `count` points inside `rect` in ascending key order.
    ///
    /// `rect` must already be normalized. Returns the number of points
    /// emitted.
    pub fn search<F>(&self, rect: &Rect, count: usize, mut emit: F) -> usize
    where
        F: FnMut(&RankedPoint),
    {
        let Some(root) = self.root else {
            return 0;
        };
        if count == 0 {
            return 0;
        }

        let mut heap = CandidateHeap::new();
        self.push_node(&mut heap, rect, root);

        let mut found = 0;
        while let Some(Reverse((_, candidate))) = heap.pop() {
            match candidate {
                Candidate::Point { index, leaf_end } => {
                    emit(&self.points[index]);
                    found += 1;
                    if found == count {
                        break;
                    }
                    self.push_next_match(&mut heap, rect, index + 1, leaf_end);
                }
                Candidate::Node(node) => match self.nodes[node].kind {
                    NodeKind::Leaf { start, end } => {
                        self.push_next_match(&mut heap, rect, start, end);
                    }
                    NodeKind::Branch { left, right } => {
                        self.push_node(&mut heap, rect, left);
                        self.push_node(&mut heap, rect, right);
                    }
                },
            }
        }

        found
    }

    fn push_node(&self, heap: &mut CandidateHeap, rect: &Rect, node: usize) {
        let entry = &self.nodes[node];
        if entry.bounds.intersects(rect) {
            heap.push(Reverse((entry.min_key, Candidate::Node(node))));
        }
    }

    /// Push the first point of `from..leaf_end` inside `rect`, if any.
    fn push_next_match(&self, heap: &mut CandidateHeap, rect: &Rect, from: usize, leaf_end: usize) {
        let next = self.points[from..leaf_end]
            .iter()
            .position(|p| rect.contains(p.point.x, p.point.y));

        if let Some(offset) = next {
            let index = from + offset;
            heap.push(Reverse((
                self.points[index].key(),
                Candidate::Point { index, leaf_end },
            )));
        }
    }
}

/// Recursively build the subtree over `slice`, which starts at `offset` in
/// the flat point array. Returns the new node's index.
fn build_node(
    nodes: &mut Vec<KdNode>,
    slice: &mut [RankedPoint],
    offset: usize,
    leaf_size: usize,
) -> usize {
    let bounds = Rect::bounding(slice.iter().map(|p| (p.point.x, p.point.y))).unwrap_or(Rect::EMPTY);

    if slice.len() <= leaf_size {
        slice.sort_unstable_by(RankedPoint::cmp_key);
        let min_key = slice.first().map_or(RankKey::MAX, RankedPoint::key);
        nodes.push(KdNode {
            bounds,
            min_key,
            kind: NodeKind::Leaf {
                start: offset,
                end: offset + slice.len(),
            },
        });
        return nodes.len() - 1;
    }

    let mid = slice.len() / 2;
    if bounds.width() >= bounds.height() {
        slice.select_nth_unstable_by(mid, |a, b| a.point.x.total_cmp(&b.point.x));
    } else {
        slice.select_nth_unstable_by(mid, |a, b| a.point.y.total_cmp(&b.point.y));
    }

    let (low, high) = slice.split_at_mut(mid);
    let left = build_node(nodes, low, offset, leaf_size);
    let right = build_node(nodes, high, offset + mid, leaf_size);
    let min_key = nodes[left].min_key.min(nodes[right].min_key);

    nodes.push(KdNode {
        bounds,
        min_key,
        kind: NodeKind::Branch { left, right },
    });
    nodes.len() - 1
}
