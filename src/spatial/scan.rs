//! Rank-sorted linear scan.
//!
//! The correctness baseline: points sorted once by rank key, then scanned
//! front to back until enough matches are found. Query cost is bounded by
//! the position of the `count`-th match, not by the total number of points.

use crate::geometry::{RankedPoint, Rect};

/// Points in ascending rank-key order.
#[derive(Debug, Clone, Default)]
pub struct RankScan {
    points: Vec<RankedPoint>,
}

impl RankScan {
    /// Sort the points by rank key and take ownership of them.
    pub fn build(mut points: Vec<RankedPoint>) -> Self {
        points.sort_unstable_by(RankedPoint::cmp_key);
        Self { points }
    }

    /// Number of points stored.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no points are stored.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Emit up to `count` points inside `rect` in ascending key order.
    pub fn search<F>(&self, rect: &Rect, count: usize, mut emit: F) -> usize
    where
        F: FnMut(&RankedPoint),
    {
        let mut found = 0;
        for p in self
            .points
            .iter()
            .filter(|p| rect.contains(p.point.x, p.point.y))
            .take(count)
        {
            emit(p);
            found += 1;
        }
        found
    }
}
