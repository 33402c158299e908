//! Immutable point stores and the search context that owns them.
//!
//! A `PointStore` is built once from a snapshot of the caller's points and
//! never changes afterwards, so any number of threads may search it at once.
//! A `SearchContext` wraps exactly one store and carries the boundary
//! conventions (integer counts, status codes, configuration fallback).

mod context;
mod point_store;

pub use context::{STATUS_NULL_CONTEXT, STATUS_OK, SearchContext, clamp_count, load_config};
pub use point_store::PointStore;
