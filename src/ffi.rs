//! C ABI for loading the search engine as a native plugin.
//!
//! The host resolves three unmangled symbols:
//!
//! - `create(points_begin, points_end)` builds a context from a half-open
//!   range of points that is only valid for the duration of the call
//! - `search(context, rect, count, out_points)` writes up to `count` points,
//!   lowest rank first, into a caller-owned buffer and returns how many
//! - `destroy(context)` releases the context and returns a status code
//!
//! No panic crosses this boundary. A fault while building yields an empty
//! context; a fault while searching returns the points already written.

use std::panic::{self, AssertUnwindSafe};

use crate::config::SearchConfig;
use crate::geometry::{Point, Rect};
use crate::store::{STATUS_NULL_CONTEXT, SearchContext, clamp_count};

/// Point layout shared with the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawPoint {
    pub id: i8,
    pub rank: i32,
    pub x: f32,
    pub y: f32,
}

/// Rectangle layout shared with the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawRect {
    pub lx: f32,
    pub ly: f32,
    pub hx: f32,
    pub hy: f32,
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        Point::new(raw.id, raw.rank, f64::from(raw.x), f64::from(raw.y))
    }
}

impl From<&Point> for RawPoint {
    // Stored coordinates were widened from f32, so narrowing is exact.
    fn from(point: &Point) -> Self {
        Self {
            id: point.id,
            rank: point.rank,
            x: point.x as f32,
            y: point.y as f32,
        }
    }
}

impl From<RawRect> for Rect {
    fn from(raw: RawRect) -> Self {
        Rect::new(
            f64::from(raw.lx),
            f64::from(raw.ly),
            f64::from(raw.hx),
            f64::from(raw.hy),
        )
    }
}

/// View a half-open pointer range as a slice. Null or inverted ranges are
/// empty.
///
/// # Safety
///
/// When both pointers are non-null and `end > begin`, they must bound one
/// readable allocation of `RawPoint`s that outlives `'a`.
unsafe fn raw_range<'a>(begin: *const RawPoint, end: *const RawPoint) -> &'a [RawPoint] {
    if begin.is_null() || end.is_null() || end <= begin {
        return &[];
    }
    // SAFETY: both pointers bound the same allocation per the caller contract.
    let len = usize::try_from(unsafe { end.offset_from(begin) }).unwrap_or(0);
    // SAFETY: `len` elements starting at `begin` are readable.
    unsafe { std::slice::from_raw_parts(begin, len) }
}

/// Load the points in `[points_begin, points_end)` into a new search context.
///
/// The points are copied before this returns. Never returns null.
///
/// # Safety
///
/// The range must be null, empty, or readable for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn create(
    points_begin: *const RawPoint,
    points_end: *const RawPoint,
) -> *mut SearchContext {
    // SAFETY: forwarded caller contract.
    let points = unsafe { raw_range(points_begin, points_end) };

    let context = panic::catch_unwind(|| {
        SearchContext::create(points.iter().copied().map(Point::from))
    })
    .unwrap_or_else(|_| {
        tracing::warn!(
            points = points.len(),
            "Panic while building search context, continuing with an empty one"
        );
        SearchContext::with_config(std::iter::empty(), &SearchConfig::default())
    });

    Box::into_raw(Box::new(context))
}

/// Copy up to `count` lowest-rank points inside `rect` into `out_points`,
/// lowest rank first. Returns the number of points copied.
///
/// # Safety
///
/// `sc` must be null or a live pointer returned by [`create`]. `out_points`
/// must be null or writable for `count` points.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn search(
    sc: *mut SearchContext,
    rect: RawRect,
    count: i32,
    out_points: *mut RawPoint,
) -> i32 {
    // SAFETY: non-null handles come from `create` and stay live until `destroy`.
    let Some(context) = (unsafe { sc.as_ref() }) else {
        return 0;
    };
    let limit = clamp_count(count);
    if out_points.is_null() || limit == 0 {
        return 0;
    }

    // SAFETY: the caller's buffer holds at least `count` points.
    let out = unsafe { std::slice::from_raw_parts_mut(out_points, limit) };
    let mut written = 0usize;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        context.store().search_with(Rect::from(rect), limit, |point| {
            out[written] = RawPoint::from(point);
            written += 1;
        })
    }));

    if outcome.is_err() {
        tracing::warn!(written, "Panic during search, returning partial results");
    }
    i32::try_from(written).unwrap_or(i32::MAX)
}

/// Release a context returned by [`create`].
///
/// Returns 0 on success and 1 when `sc` is null.
///
/// # Safety
///
/// `sc` must be null or a pointer returned by [`create`] that has not been
/// destroyed, with no search running on it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn destroy(sc: *mut SearchContext) -> i32 {
    if sc.is_null() {
        return STATUS_NULL_CONTEXT;
    }
    // SAFETY: ownership returns from the host exactly once.
    let context = unsafe { Box::from_raw(sc) };
    context.destroy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::STATUS_OK;

    fn raw(id: i8, rank: i32, x: f32, y: f32) -> RawPoint {
        RawPoint { id, rank, x, y }
    }

    fn create_from(points: &[RawPoint]) -> *mut SearchContext {
        let range = points.as_ptr_range();
        unsafe { create(range.start, range.end) }
    }

    fn search_into(sc: *mut SearchContext, rect: RawRect, count: i32) -> Vec<RawPoint> {
        let mut out = vec![RawPoint::default(); count.max(0) as usize];
        let written = unsafe { search(sc, rect, count, out.as_mut_ptr()) };
        out.truncate(written as usize);
        out
    }

    #[test]
    fn test_layout_matches_host() {
        assert_eq!(std::mem::size_of::<RawPoint>(), 16);
        assert_eq!(std::mem::align_of::<RawPoint>(), 4);
        assert_eq!(std::mem::size_of::<RawRect>(), 16);
    }

    #[test]
    fn test_create_search_destroy() {
        let points = [raw(0, 3, 0.0, 0.0), raw(1, 1, 1.0, 1.0), raw(2, 2, 5.0, 5.0)];
        let sc = create_from(&points);
        assert!(!sc.is_null());

        let rect = RawRect { lx: 0.0, ly: 0.0, hx: 2.0, hy: 2.0 };
        let found = search_into(sc, rect, 2);
        assert_eq!(found, vec![raw(1, 1, 1.0, 1.0), raw(0, 3, 0.0, 0.0)]);

        assert_eq!(unsafe { destroy(sc) }, STATUS_OK);
    }

    #[test]
    fn test_context_survives_input_buffer() {
        let sc = {
            let points: Vec<RawPoint> = (0..100).map(|i| raw(0, 100 - i, i as f32, 0.0)).collect();
            create_from(&points)
        };

        let rect = RawRect { lx: 0.0, ly: -1.0, hx: 99.0, hy: 1.0 };
        let ranks: Vec<i32> = search_into(sc, rect, 3).iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);

        assert_eq!(unsafe { destroy(sc) }, STATUS_OK);
    }

    #[test]
    fn test_ruggedness_with_null_inputs() {
        let sc = unsafe { create(std::ptr::null(), std::ptr::null()) };
        assert!(!sc.is_null());

        let rect = RawRect { lx: -1.0, ly: -1.0, hx: 1.0, hy: 1.0 };
        assert_eq!(unsafe { search(sc, rect, 20, std::ptr::null_mut()) }, 0);
        assert!(search_into(sc, rect, 20).is_empty());

        assert_eq!(unsafe { destroy(sc) }, STATUS_OK);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let points = [raw(0, 1, 0.0, 0.0), raw(1, 2, 0.0, 0.0)];
        let range = points.as_ptr_range();
        let sc = unsafe { create(range.end, range.start) };

        let rect = RawRect { lx: -1.0, ly: -1.0, hx: 1.0, hy: 1.0 };
        assert!(search_into(sc, rect, 5).is_empty());
        assert_eq!(unsafe { destroy(sc) }, STATUS_OK);
    }

    #[test]
    fn test_null_context() {
        let rect = RawRect::default();
        let mut out = [RawPoint::default(); 4];
        assert_eq!(unsafe { search(std::ptr::null_mut(), rect, 4, out.as_mut_ptr()) }, 0);
        assert_eq!(unsafe { destroy(std::ptr::null_mut()) }, STATUS_NULL_CONTEXT);
    }

    #[test]
    fn test_non_positive_count_writes_nothing() {
        let points = [raw(7, 1, 0.0, 0.0)];
        let sc = create_from(&points);
        let rect = RawRect { lx: 0.0, ly: 0.0, hx: 0.0, hy: 0.0 };

        let mut out = [RawPoint::default(); 1];
        assert_eq!(unsafe { search(sc, rect, 0, out.as_mut_ptr()) }, 0);
        assert_eq!(unsafe { search(sc, rect, -3, out.as_mut_ptr()) }, 0);
        assert_eq!(out[0], RawPoint::default());

        assert_eq!(unsafe { destroy(sc) }, STATUS_OK);
    }

    #[test]
    fn test_inverted_rect_is_normalized() {
        let points = [raw(0, 5, 1.0, 1.0), raw(1, 4, 2.0, 2.0), raw(2, 3, 9.0, 9.0)];
        let sc = create_from(&points);

        let inverted = RawRect { lx: 3.0, ly: 3.0, hx: 0.0, hy: 0.0 };
        let normal = RawRect { lx: 0.0, ly: 0.0, hx: 3.0, hy: 3.0 };
        assert_eq!(search_into(sc, inverted, 10), search_into(sc, normal, 10));
        assert_eq!(search_into(sc, normal, 10).len(), 2);

        assert_eq!(unsafe { destroy(sc) }, STATUS_OK);
    }
}
