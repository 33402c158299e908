//! Spatial indexing for lowest-rank rectangle queries.
//!
//! Three interchangeable structures answer the same query:
//! - `kdtree`: rank-augmented k-d tree, searched best-first by rank
//! - `rtree`: R*-tree envelope lookup reduced to the lowest ranks
//! - `scan`: rank-sorted array with early exit, the correctness baseline

mod kdtree;
mod rtree;
mod scan;

pub use kdtree::RankedKdTree;
pub use rtree::RTreeIndex;
pub use scan::RankScan;

use crate::config::{IndexStrategy, SearchConfig};
use crate::geometry::{RankedPoint, Rect};

/// One of the supported index structures.
pub enum SpatialIndex {
    /// Rank-augmented k-d tree
    RankedKdTree(RankedKdTree),
    /// rstar R*-tree
    RTree(RTreeIndex),
    /// Rank-sorted array
    RankScan(RankScan),
}

impl SpatialIndex {
    /// Build the index selected by `config`, taking ownership of the points.
    pub fn build(points: Vec<RankedPoint>, config: &SearchConfig) -> Self {
        match config.strategy {
            IndexStrategy::RankedKdTree => {
                Self::RankedKdTree(RankedKdTree::build(points, config.leaf_size))
            }
            IndexStrategy::RTree => Self::RTree(RTreeIndex::build(points)),
            IndexStrategy::RankScan => Self::RankScan(RankScan::build(points)),
        }
    }

    /// The strategy backing this index.
    pub fn strategy(&self) -> IndexStrategy {
        match self {
            Self::RankedKdTree(_) => IndexStrategy::RankedKdTree,
            Self::RTree(_) => IndexStrategy::RTree,
            Self::RankScan(_) => IndexStrategy::RankScan,
        }
    }

    /// Number of points stored.
    pub fn len(&self) -> usize {
        match self {
            Self::RankedKdTree(tree) => tree.len(),
            Self::RTree(tree) => tree.len(),
            Self::RankScan(scan) => scan.len(),
        }
    }

    /// Check if no points are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Emit up to `count` points inside the normalized `rect`, lowest rank
    /// key first. Returns the number emitted.
    pub fn search<F>(&self, rect: &Rect, count: usize, emit: F) -> usize
    where
        F: FnMut(&RankedPoint),
    {
        match self {
            Self::RankedKdTree(tree) => tree.search(rect, count, emit),
            Self::RTree(tree) => tree.search(rect, count, emit),
            Self::RankScan(scan) => scan.search(rect, count, emit),
        }
    }
}
