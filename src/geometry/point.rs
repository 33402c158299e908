//! Point type and the rank ordering.
//!
//! Points are immutable once created. Each point has:
//! - Position (x, y) on the plane
//! - A rank, where lower rank means higher priority in results
//! - An opaque one-byte id carried through unchanged

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A ranked point on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Opaque caller payload.
    pub id: i8,
    /// Priority key; lower ranks are returned first.
    pub rank: i32,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new Point.
    #[inline]
    pub fn new(id: i8, rank: i32, x: f64, y: f64) -> Self {
        Self { id, rank, x, y }
    }

    /// Check that both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point(rank={}, x={}, y={}, id={})", self.rank, self.x, self.y, self.id)
    }
}

/// Result ordering key.
///
/// Ranks are compared first; equal ranks fall back to the position the point
/// had in the caller's input, so ties come back in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RankKey {
    /// The point's rank.
    pub rank: i32,
    /// The point's position in the input sequence.
    pub seq: usize,
}

impl RankKey {
    /// Largest possible key. Used as the minimum of an empty subtree.
    pub const MAX: RankKey = RankKey {
        rank: i32::MAX,
        seq: usize::MAX,
    };
}

/// A point tagged with its input position.
///
/// This is the unit every index stores internally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedPoint {
    /// The stored point.
    pub point: Point,
    /// Position in the caller's input sequence.
    pub seq: usize,
}

impl RankedPoint {
    #[inline]
    pub fn new(point: Point, seq: usize) -> Self {
        Self { point, seq }
    }

    /// The ordering key of this point.
    #[inline]
    pub fn key(&self) -> RankKey {
        RankKey {
            rank: self.point.rank,
            seq: self.seq,
        }
    }

    /// Compare two ranked points by key.
    #[inline]
    pub fn cmp_key(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
