//! Geometry primitives shared by every index strategy.
//!
//! This module provides the ranked point model and the query rectangle:
//! - `Point`: a ranked 2D point with an opaque id payload
//! - `RankKey`: the total order used for results (rank, then input order)
//! - `Rect`: an axis-aligned, inclusive query rectangle

mod point;
mod rect;

pub use point::{Point, RankKey, RankedPoint};
pub use rect::Rect;
