//! Sorted, non-overlapping interval set
//!
//! Invariant held after every update: ranges are sorted ascending by
//! `start` and pairwise non-overlapping; adjacent or overlapping inserts
//! coalesce into one range. "Covered with no data" is therefore
//! distinguishable from "not yet checked".

use smallvec::SmallVec;
use tracemark_core::TimeRange;

/// Gap lists are almost always tiny (a viewport pan produces one or two
/// uncovered segments), so they stay inline.
pub type GapList = SmallVec<[TimeRange; 4]>;

/// The set of covered time ranges for one layer.
#[derive(Debug, Clone, Default)]
pub struct CoverageMap {
    ranges: Vec<TimeRange>,
}

impl CoverageMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The covered ranges, sorted and non-overlapping.
    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    /// Is `request` fully inside the covered set?
    pub fn covers(&self, request: &TimeRange) -> bool {
        // A fully-covered request sits inside a single range: coalescing
        // guarantees no covered interval is split across entries.
        let idx = self.ranges.partition_point(|r| r.start <= request.start);
        idx.checked_sub(1)
            .map(|i| self.ranges[i].contains_range(request))
            .unwrap_or(false)
    }

    /// Record `range` as covered, merging with any adjacent or
    /// overlapping entries. Idempotent: re-recording covered intervals
    /// changes nothing.
    pub fn record(&mut self, range: TimeRange) {
        if range.is_empty() {
            return;
        }
        // Entries strictly before the first that could touch `range`.
        let lo = self.ranges.partition_point(|r| r.end < range.start);
        // Entries from `lo` whose start is within reach of `range.end`.
        let hi = lo + self.ranges[lo..].partition_point(|r| r.start <= range.end);

        let mut merged = range;
        for r in &self.ranges[lo..hi] {
            merged = merged.merge(r);
        }
        self.ranges.splice(lo..hi, std::iter::once(merged));
    }

    /// Uncovered sub-ranges of `request`, in order.
    ///
    /// Fast path: a request entirely inside one covered range returns an
    /// empty list without scanning. Otherwise the scan advances the lower
    /// bound past each covered segment it meets, emitting the skipped
    /// segments as gaps, and stops once the upper bound is satisfied; any
    /// remaining tail becomes a final gap.
    pub fn gaps(&self, request: &TimeRange) -> GapList {
        let mut out = GapList::new();
        if request.is_empty() || self.covers(request) {
            return out;
        }
        let mut lo = request.start;
        for r in &self.ranges {
            if r.end <= lo {
                continue;
            }
            if r.start >= request.end {
                break;
            }
            if r.start > lo {
                out.push(TimeRange {
                    start: lo,
                    end: r.start.min(request.end),
                });
            }
            lo = lo.max(r.end);
            if lo >= request.end {
                return out;
            }
        }
        if lo < request.end {
            out.push(TimeRange {
                start: lo,
                end: request.end,
            });
        }
        out
    }

    /// Drop all coverage (session reset).
    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}
