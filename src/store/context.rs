//! SearchContext - one built store plus the boundary conventions.

use crate::config::SearchConfig;
use crate::geometry::{Point, Rect};
use crate::store::PointStore;

/// Status returned by a successful `destroy`.
pub const STATUS_OK: i32 = 0;

/// Status returned when `destroy` is handed no context.
pub const STATUS_NULL_CONTEXT: i32 = 1;

/// Convert a caller-supplied result count into a usable limit.
///
/// Zero and negative counts become zero.
#[inline]
pub fn clamp_count(count: i32) -> usize {
    usize::try_from(count).unwrap_or(0)
}

/// Load configuration from the environment, falling back to defaults.
///
/// Configuration problems must never stop a context from being created, so
/// failures are logged and ignored.
pub fn load_config() -> SearchConfig {
    SearchConfig::load().unwrap_or_else(|err| {
        tracing::warn!(%err, "Ignoring invalid search configuration, using defaults");
        SearchConfig::default()
    })
}

/// Opaque handle wrapping exactly one point store.
///
/// Created by [`create`](SearchContext::create), queried any number of
/// times, released by [`destroy`](SearchContext::destroy).
pub struct SearchContext {
    store: PointStore,
}

impl SearchContext {
    /// Build a context from the caller's points using the environment
    /// configuration.
    ///
    /// The points are copied before this returns.
    pub fn create<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        Self::with_config(points, &load_config())
    }

    /// Build a context with an explicit configuration.
    pub fn with_config<I>(points: I, config: &SearchConfig) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        Self {
            store: PointStore::build_with(points, config),
        }
    }

    /// The store behind this context.
    pub fn store(&self) -> &PointStore {
        &self.store
    }

    /// Find up to `count` lowest-rank points inside `rect`, lowest first.
    ///
    /// Non-positive counts return an empty result.
    pub fn search(&self, rect: Rect, count: i32) -> Vec<Point> {
        self.store.search(rect, clamp_count(count))
    }

    /// Stream up to `count` lowest-rank points inside `rect` to `emit`.
    pub fn search_with<F>(&self, rect: Rect, count: i32, emit: F) -> usize
    where
        F: FnMut(&Point),
    {
        self.store.search_with(rect, clamp_count(count), emit)
    }

    /// Release the context and everything it owns.
    pub fn destroy(self) -> i32 {
        tracing::debug!(points = self.store.len(), "Destroying search context");
        drop(self);
        STATUS_OK
    }
}
