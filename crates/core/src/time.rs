//! Half-open time intervals
//!
//! All timestamps are server-owned `i64` epoch values (the engine never
//! interprets their unit). Ranges are half-open: `[start, end)`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open time interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound
    pub start: i64,
    /// Exclusive upper bound
    pub end: i64,
}

impl TimeRange {
    /// Create a range, rejecting degenerate input.
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Length of the interval.
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    /// True when the interval is degenerate. `TimeRange::new` never
    /// produces one; this exists for callers doing raw construction.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Does this range contain the instant `t`?
    pub fn contains(&self, t: i64) -> bool {
        self.start <= t && t < self.end
    }

    /// Does this range fully contain `other`?
    pub fn contains_range(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Do the two ranges share at least one instant?
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Overlapping or exactly adjacent (touching bounds). Ranges in this
    /// relation coalesce into one covered range.
    pub fn touches(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Union of two touching ranges.
    pub fn merge(&self, other: &TimeRange) -> TimeRange {
        TimeRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Intersection, or None when the ranges do not overlap.
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(TimeRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
