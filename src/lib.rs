//! Rank Range Search
//!
//! Given a static set of ranked points on a plane, build a query structure
//! once, then repeatedly find the K lowest-rank points inside axis-aligned
//! rectangles. The crate compiles to a native plugin exposing a C ABI and to
//! WebAssembly exposing a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `geometry`: ranked points, rank keys and query rectangles
//! - `spatial`: index structures (ranked k-d tree, R-tree, rank scan)
//! - `store`: the immutable point store and the search context around it
//! - `config`: strategy selection and tuning, overridable from the environment
//! - `ffi`: `create` / `search` / `destroy` for native hosts

use js_sys::Float64Array;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod ffi;
pub mod geometry;
pub mod spatial;
pub mod store;

pub use config::{IndexStrategy, SearchConfig};
pub use error::{Error, Result};
pub use geometry::{Point, RankKey, Rect};
pub use store::{PointStore, SearchContext};

use store::clamp_count;

/// Number of values per point in flat result buffers: x, y, rank, id.
pub const FLAT_STRIDE: usize = 4;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Search context exposed to JavaScript.
///
/// Owns one immutable point store. Calling `free()` from JavaScript releases
/// it.
#[wasm_bindgen]
pub struct PointSearchWasm {
    store: PointStore,
}

#[wasm_bindgen]
impl PointSearchWasm {
    /// Build a search context from an array of `{ id, rank, x, y }` objects
    /// using the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(points: JsValue) -> std::result::Result<PointSearchWasm, JsValue> {
        let points: Vec<Point> = decode("points", points)?;
        Ok(Self::from_points(points, &SearchConfig::default()))
    }

    /// Build a search context with an explicit configuration object, e.g.
    /// `{ strategy: "r_tree" }` or `{ strategy: "ranked_kd_tree", leaf_size: 64 }`.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        points: JsValue,
        config: JsValue,
    ) -> std::result::Result<PointSearchWasm, JsValue> {
        let points: Vec<Point> = decode("points", points)?;
        let config: SearchConfig = decode("config", config)?;
        config.validate().map_err(to_js_error)?;
        Ok(Self::from_points(points, &config))
    }

    /// Build a search context from parallel columns.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates
    /// * `ys` - Y coordinates
    /// * `ranks` - Point ranks
    /// * `ids` - Opaque point ids
    #[wasm_bindgen(js_name = fromArrays)]
    pub fn from_arrays(
        xs: &[f64],
        ys: &[f64],
        ranks: &[i32],
        ids: &[i8],
    ) -> std::result::Result<PointSearchWasm, JsValue> {
        let points = points_from_columns(xs, ys, ranks, ids).map_err(to_js_error)?;
        Ok(Self::from_points(points, &SearchConfig::default()))
    }

    /// Find up to `count` lowest-rank points inside `rect`.
    ///
    /// `rect` is a `{ lx, ly, hx, hy }` object; inverted bounds are swapped.
    /// Returns an array of point objects, lowest rank first.
    pub fn search(&self, rect: JsValue, count: i32) -> std::result::Result<JsValue, JsValue> {
        let rect: Rect = decode("rect", rect)?;
        let results = self.store.search(rect, clamp_count(count));
        serde_wasm_bindgen::to_value(&results).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Find up to `count` lowest-rank points inside the rectangle.
    ///
    /// Returns a Float64Array `[x0, y0, rank0, id0, x1, ...]`.
    #[wasm_bindgen(js_name = searchFlat)]
    pub fn search_flat(&self, lx: f64, ly: f64, hx: f64, hy: f64, count: i32) -> Float64Array {
        let flat = flatten_results(&self.store, Rect::new(lx, ly, hx, hy), clamp_count(count));
        Float64Array::from(&flat[..])
    }

    /// Get the number of searchable points.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the context holds no points.
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get the number of input points rejected for non-finite coordinates.
    #[wasm_bindgen(js_name = droppedCount)]
    pub fn dropped_count(&self) -> usize {
        self.store.dropped_count()
    }

    /// Get the configured index strategy name.
    pub fn strategy(&self) -> String {
        self.store.strategy().as_str().to_string()
    }
}

impl PointSearchWasm {
    fn from_points(points: Vec<Point>, config: &SearchConfig) -> Self {
        let store = PointStore::build_with(points, config);
        report_dropped(store.dropped_count());
        Self { store }
    }

    /// The store behind this context.
    pub fn store(&self) -> &PointStore {
        &self.store
    }
}

/// Zip parallel columns into points.
///
/// # Errors
///
/// Returns [`Error::LengthMismatch`] if any column differs in length from `xs`.
pub fn points_from_columns(xs: &[f64], ys: &[f64], ranks: &[i32], ids: &[i8]) -> Result<Vec<Point>> {
    let expected = xs.len();
    for (column, actual) in [("ys", ys.len()), ("ranks", ranks.len()), ("ids", ids.len())] {
        if actual != expected {
            return Err(Error::LengthMismatch {
                column,
                expected,
                actual,
            });
        }
    }

    Ok(xs
        .iter()
        .zip(ys)
        .zip(ranks)
        .zip(ids)
        .map(|(((&x, &y), &rank), &id)| Point::new(id, rank, x, y))
        .collect())
}

/// Run a search and lay the results out as `[x, y, rank, id]` per point.
pub fn flatten_results(store: &PointStore, rect: Rect, count: usize) -> Vec<f64> {
    let mut flat = Vec::with_capacity(count.min(store.len()) * FLAT_STRIDE);
    store.search_with(rect, count, |point| {
        flat.extend_from_slice(&[point.x, point.y, f64::from(point.rank), f64::from(point.id)]);
    });
    flat
}

fn decode<T: DeserializeOwned>(what: &'static str, value: JsValue) -> std::result::Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        to_js_error(Error::Decode {
            what,
            message: e.to_string(),
        })
    })
}

fn to_js_error(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(target_arch = "wasm32")]
fn report_dropped(dropped: usize) {
    if dropped > 0 {
        web_sys::console::warn_1(
            &format!("rank-range-search: dropped {dropped} points with non-finite coordinates").into(),
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn report_dropped(_dropped: usize) {}

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// The full pipeline behind `fromArrays` + `searchFlat`, without
    /// wasm_bindgen JS types.
    #[test]
    fn test_columns_to_flat_results() {
        let points = points_from_columns(
            &[0.0, 1.0, 5.0],
            &[0.0, 1.0, 5.0],
            &[3, 1, 2],
            &[10, 11, 12],
        )
        .expect("columns");
        let store = PointStore::build(points);

        let flat = flatten_results(&store, Rect::new(0.0, 0.0, 2.0, 2.0), 2);
        assert_eq!(flat, vec![1.0, 1.0, 1.0, 11.0, 0.0, 0.0, 3.0, 10.0]);
        assert_eq!(flat.len() % FLAT_STRIDE, 0);
    }

    #[test]
    fn test_columns_length_mismatch() {
        let err = points_from_columns(&[0.0, 1.0], &[0.0, 1.0], &[1], &[0, 0]).unwrap_err();
        assert_eq!(err.code(), "PS-003");
        assert!(err.to_string().contains("'ranks'"));
    }

    #[test]
    fn test_flat_results_empty_for_zero_count() {
        let store = PointStore::build(vec![Point::new(0, 0, 0.0, 0.0)]);
        assert!(flatten_results(&store, Rect::new(0.0, 0.0, 0.0, 0.0), 0).is_empty());
    }

    /// Every strategy behind a context answers a harness-sized workload the
    /// same way.
    #[test]
    fn test_strategies_agree_on_large_workload() {
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        let mut next = move || {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        let points: Vec<Point> = (0..20_000)
            .map(|_| {
                let x = (next() % 100_000) as f64 - 50_000.0;
                let y = (next() % 100_000) as f64 - 50_000.0;
                let rank = (next() % 1_000_000) as i32;
                Point::new((next() % 256) as u8 as i8, rank, x, y)
            })
            .collect();

        let contexts: Vec<SearchContext> = [
            IndexStrategy::RankedKdTree,
            IndexStrategy::RTree,
            IndexStrategy::RankScan,
        ]
        .into_iter()
        .map(|strategy| SearchContext::with_config(points.iter().copied(), &SearchConfig::with_strategy(strategy)))
        .collect();

        for _ in 0..200 {
            let rect = Rect::new(
                (next() % 100_000) as f64 - 50_000.0,
                (next() % 100_000) as f64 - 50_000.0,
                (next() % 100_000) as f64 - 50_000.0,
                (next() % 100_000) as f64 - 50_000.0,
            );
            let expected = contexts[2].search(rect, 20);
            assert!(expected.len() <= 20);
            for context in &contexts[..2] {
                assert_eq!(context.search(rect, 20), expected);
            }
        }
    }
}
