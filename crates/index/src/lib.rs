//! Binary-search utilities over sorted annotation arrays
//!
//! Stateless helpers for temporal navigation. The search is tolerant of
//! duplicate keys (zero-duration annotations at the same instant are
//! common), with explicit first/last tie-breaking, and reports misses as a
//! decoded insertion point so callers can resolve "nearest at-or-before"
//! without a second search.
//!
//! Pointer hit-testing does not go through this index: hit-testing is by
//! screen position over the render list, not by timestamp.

#![warn(missing_docs)]
#![warn(clippy::all)]

use tracemark_core::Annotation;

/// Which index to return when several elements share the probed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Smallest index with the key
    First,
    /// Largest index with the key
    Last,
}

/// Outcome of a key lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Exact match at this index (tie-broken per [`Bias`])
    Hit(usize),
    /// No exact match. `before` is the index immediately below the
    /// would-be position: `None` when the probe sorts before every
    /// element, `Some(len - 1)` when it sorts after the last.
    Miss {
        /// Index of the greatest element below the probe, if any
        before: Option<usize>,
    },
}

impl Lookup {
    /// The sort-preserving insertion index for the probed key.
    pub fn insertion_index(&self) -> usize {
        match *self {
            Lookup::Hit(i) => i,
            Lookup::Miss { before } => before.map_or(0, |i| i + 1),
        }
    }

    /// Index of the element at or immediately before the probed key.
    pub fn at_or_before(&self) -> Option<usize> {
        match *self {
            Lookup::Hit(i) => Some(i),
            Lookup::Miss { before } => before,
        }
    }
}

/// First index whose key is `>=` probe (== `items.len()` when none is).
fn lower_bound<T, F>(items: &[T], probe: i64, key_fn: &F) -> usize
where
    F: Fn(&T) -> i64,
{
    let mut lo = 0;
    let mut hi = items.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if key_fn(&items[mid]) < probe {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// First index whose key is `>` probe (== `items.len()` when none is).
fn upper_bound<T, F>(items: &[T], probe: i64, key_fn: &F) -> usize
where
    F: Fn(&T) -> i64,
{
    let mut lo = 0;
    let mut hi = items.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if key_fn(&items[mid]) <= probe {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Binary search over `items` (sorted ascending by `key_fn`) for `probe`.
///
/// O(log n) including the duplicate tie-break: rather than walking
/// neighboring duplicates one by one, both bias modes are boundary
/// searches with explicit bounds.
pub fn index_of<T, F>(items: &[T], probe: i64, bias: Bias, key_fn: F) -> Lookup
where
    F: Fn(&T) -> i64,
{
    let lower = lower_bound(items, probe, &key_fn);
    if lower < items.len() && key_fn(&items[lower]) == probe {
        return match bias {
            Bias::First => Lookup::Hit(lower),
            Bias::Last => Lookup::Hit(upper_bound(items, probe, &key_fn) - 1),
        };
    }
    Lookup::Miss {
        before: lower.checked_sub(1),
    }
}

/// Index of the first annotation starting strictly after `time`.
pub fn find_next(annotations: &[Annotation], time: i64) -> Option<usize> {
    let idx = upper_bound(annotations, time, &|a: &Annotation| a.start);
    (idx < annotations.len()).then_some(idx)
}

/// Index of the last annotation starting strictly before `time`.
pub fn find_previous(annotations: &[Annotation], time: i64) -> Option<usize> {
    let idx = lower_bound(annotations, time, &|a: &Annotation| a.start);
    idx.checked_sub(1)
}
