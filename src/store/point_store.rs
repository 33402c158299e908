//! PointStore - the built, read-only query structure.

use crate::config::{IndexStrategy, SearchConfig};
use crate::geometry::{Point, RankedPoint, Rect};
use crate::spatial::SpatialIndex;

/// An immutable snapshot of ranked points behind a spatial index.
///
/// The store owns private copies of every point it accepted. Points with
/// non-finite coordinates are dropped during the build; everything else,
/// including duplicate coordinates and duplicate ranks, is kept.
pub struct PointStore {
    index: SpatialIndex,
    dropped: usize,
}

impl PointStore {
    /// Build a store with the default configuration.
    pub fn build<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        Self::build_with(points, &SearchConfig::default())
    }

    /// Build a store using the strategy and tuning in `config`.
    ///
    /// Each point is tagged with its position in `points`; that position
    /// breaks rank ties in query results.
    pub fn build_with<I>(points: I, config: &SearchConfig) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut dropped = 0usize;
        let ranked: Vec<RankedPoint> = points
            .into_iter()
            .enumerate()
            .filter_map(|(seq, point)| {
                if point.is_finite() {
                    Some(RankedPoint::new(point, seq))
                } else {
                    dropped += 1;
                    None
                }
            })
            .collect();

        if dropped > 0 {
            tracing::warn!(dropped, "Dropped points with non-finite coordinates");
        }

        let index = SpatialIndex::build(ranked, config);
        tracing::debug!(
            points = index.len(),
            dropped,
            strategy = config.strategy.as_str(),
            "Built point store"
        );

        Self { index, dropped }
    }

    /// Number of points available to queries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the store holds no points.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of input points rejected during the build.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// The index strategy backing this store.
    pub fn strategy(&self) -> IndexStrategy {
        self.index.strategy()
    }

    /// Find the `count` lowest-rank points inside `rect`, lowest first.
    pub fn search(&self, rect: Rect, count: usize) -> Vec<Point> {
        let mut results = Vec::with_capacity(count.min(self.len()));
        self.search_with(rect, count, |point| results.push(*point));
        results
    }

    /// Stream the `count` lowest-rank points inside `rect` to `emit`, lowest
    /// first. Returns the number of points emitted.
    ///
    /// The rectangle is normalized on a local copy. A rectangle with a NaN
    /// bound matches nothing. `count` is clamped to the store size.
    pub fn search_with<F>(&self, rect: Rect, count: usize, mut emit: F) -> usize
    where
        F: FnMut(&Point),
    {
        let rect = rect.normalized();
        let count = count.min(self.len());
        if count == 0 || rect.has_nan() {
            return 0;
        }

        let found = self.index.search(&rect, count, |entry| emit(&entry.point));
        tracing::trace!(?rect, count, found, "Range search");
        found
    }
}
