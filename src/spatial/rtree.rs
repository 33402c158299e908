//! R-tree based index using the rstar crate.
//!
//! Points are bulk loaded into an R*-tree. A query collects every point in
//! the rectangle envelope and keeps the `count` lowest rank keys in a bounded
//! max-heap, so memory stays O(count) however many points match.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rstar::{AABB, RTree, RTreeObject};

use crate::geometry::{RankedPoint, Rect};

/// A ranked point stored in the R-tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    /// The stored point with its input position.
    pub entry: RankedPoint,
}

impl IndexedPoint {
    /// Create a new IndexedPoint.
    pub fn new(entry: RankedPoint) -> Self {
        Self { entry }
    }
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.entry.point.x, self.entry.point.y])
    }
}

/// Orders borrowed points by rank key for the bounded heap.
struct ByKey<'a>(&'a RankedPoint);

impl PartialEq for ByKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0.key() == other.0.key()
    }
}

impl Eq for ByKey<'_> {}

impl PartialOrd for ByKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp_key(other.0)
    }
}

/// Spatial index over ranked points.
///
/// Uses an R*-tree for the rectangle lookup.
pub struct RTreeIndex {
    tree: RTree<IndexedPoint>,
}

impl RTreeIndex {
    /// Bulk load the index from owned points.
    ///
    /// This is more efficient than incremental inserts.
    pub fn build(points: Vec<RankedPoint>) -> Self {
        let indexed: Vec<_> = points.into_iter().map(IndexedPoint::new).collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    /// Find all points within a rectangle, in no particular order.
    pub fn in_rect(&self, rect: Rect) -> impl Iterator<Item = &RankedPoint> {
        let envelope = AABB::from_corners([rect.lx, rect.ly], [rect.hx, rect.hy]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|indexed| &indexed.entry)
    }

    /// Emit up to `count` points inside `rect` in ascending key order.
    ///
    /// `rect` must already be normalized.
    pub fn search<F>(&self, rect: &Rect, count: usize, mut emit: F) -> usize
    where
        F: FnMut(&RankedPoint),
    {
        if count == 0 {
            return 0;
        }

        let mut best: BinaryHeap<ByKey<'_>> = BinaryHeap::with_capacity(count.min(self.len()) + 1);
        for entry in self.in_rect(*rect) {
            if best.len() == count {
                let improves = best
                    .peek()
                    .is_some_and(|worst| entry.cmp_key(worst.0) == Ordering::Less);
                if !improves {
                    continue;
                }
                best.pop();
            }
            best.push(ByKey(entry));
        }

        let best = best.into_sorted_vec();
        for ByKey(entry) in &best {
            emit(entry);
        }
        best.len()
    }

    /// Get the number of points in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for RTreeIndex {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn index(points: &[(f64, f64, i32)]) -> RTreeIndex {
        RTreeIndex::build(
            points
                .iter()
                .enumerate()
                .map(|(seq, &(x, y, rank))| RankedPoint::new(Point::new(0, rank, x, y), seq))
                .collect(),
        )
    }

    fn ranks(index: &RTreeIndex, rect: Rect, count: usize) -> Vec<i32> {
        let mut out = Vec::new();
        index.search(&rect, count, |p| out.push(p.point.rank));
        out
    }

    #[test]
    fn test_in_rect() {
        let index = index(&[(0.0, 0.0, 1), (5.0, 5.0, 2), (10.0, 10.0, 3)]);

        let in_rect: Vec<i32> = index
            .in_rect(Rect::new(-1.0, -1.0, 6.0, 6.0))
            .map(|p| p.point.rank)
            .collect();
        assert_eq!(in_rect.len(), 2);
        assert!(in_rect.contains(&1));
        assert!(in_rect.contains(&2));
    }

    #[test]
    fn test_in_rect_is_inclusive() {
        let index = index(&[(0.0, 0.0, 1), (2.0, 2.0, 2)]);
        assert_eq!(index.in_rect(Rect::new(0.0, 0.0, 2.0, 2.0)).count(), 2);
        assert_eq!(index.in_rect(Rect::new(2.0, 2.0, 2.0, 2.0)).count(), 1);
    }

    #[test]
    fn test_search_keeps_lowest_ranks() {
        let index = index(&[
            (0.0, 0.0, 50),
            (1.0, 0.0, 10),
            (2.0, 0.0, 40),
            (3.0, 0.0, 20),
            (4.0, 0.0, 30),
            (9.0, 9.0, 0),
        ]);

        assert_eq!(ranks(&index, Rect::new(0.0, 0.0, 4.0, 0.0), 3), vec![10, 20, 30]);
        assert_eq!(ranks(&index, Rect::new(0.0, 0.0, 4.0, 0.0), 100), vec![10, 20, 30, 40, 50]);
        assert!(ranks(&index, Rect::new(0.0, 0.0, 4.0, 0.0), 0).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = RTreeIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(ranks(&index, Rect::new(-1.0, -1.0, 1.0, 1.0), 5).is_empty());
    }
}
