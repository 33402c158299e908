//! Axis-aligned query rectangle.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with inclusive bounds.
///
/// Callers may pass the corners in either order; queries work on a
/// [`normalized`](Rect::normalized) copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Low X bound.
    pub lx: f64,
    /// Low Y bound.
    pub ly: f64,
    /// High X bound.
    pub hx: f64,
    /// High Y bound.
    pub hy: f64,
}

impl Rect {
    /// A rectangle that contains and intersects nothing.
    pub const EMPTY: Rect = Rect {
        lx: f64::INFINITY,
        ly: f64::INFINITY,
        hx: f64::NEG_INFINITY,
        hy: f64::NEG_INFINITY,
    };

    /// Create a new Rect from its bounds.
    #[inline]
    pub fn new(lx: f64, ly: f64, hx: f64, hy: f64) -> Self {
        Self { lx, ly, hx, hy }
    }

    /// Smallest rectangle enclosing every point in the iterator.
    ///
    /// Returns None for an empty iterator.
    pub fn bounding<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = coords.into_iter();
        let (x, y) = iter.next()?;
        let mut bounds = Self::new(x, y, x, y);
        for (x, y) in iter {
            bounds.lx = bounds.lx.min(x);
            bounds.ly = bounds.ly.min(y);
            bounds.hx = bounds.hx.max(x);
            bounds.hy = bounds.hy.max(y);
        }
        Some(bounds)
    }

    /// Return a copy with low and high bounds in the right members.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut rect = self;
        if rect.hx < rect.lx {
            std::mem::swap(&mut rect.lx, &mut rect.hx);
        }
        if rect.hy < rect.ly {
            std::mem::swap(&mut rect.ly, &mut rect.hy);
        }
        rect
    }

    /// Check whether any bound is NaN. Such a rectangle matches nothing.
    #[inline]
    pub fn has_nan(&self) -> bool {
        self.lx.is_nan() || self.ly.is_nan() || self.hx.is_nan() || self.hy.is_nan()
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.lx && x <= self.hx && y >= self.ly && y <= self.hy
    }

    /// Check whether two rectangles share at least one point.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.lx <= other.hx && other.lx <= self.hx && self.ly <= other.hy && other.ly <= self.hy
    }

    /// Check whether `other` lies entirely inside this rectangle.
    #[inline]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.lx >= self.lx && other.hx <= self.hx && other.ly >= self.ly && other.hy <= self.hy
    }

    /// Width of the rectangle along X.
    #[inline]
    pub fn width(&self) -> f64 {
        self.hx - self.lx
    }

    /// Height of the rectangle along Y.
    #[inline]
    pub fn height(&self) -> f64 {
        self.hy - self.ly
    }
}
