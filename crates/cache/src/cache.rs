//! Per-layer range cache with in-flight request tracking
//!
//! Coverage is tracked strictly per layer: one layer being fetched says
//! nothing about another. A sub-range is provisionally marked "requested"
//! before its fetch resolves (suppressing duplicate concurrent requests
//! for the same gap) and promoted to covered only on success; on failure
//! it reverts to uncovered so the next coverage check retries it.

use crate::coverage::{CoverageMap, GapList};
use rustc_hash::FxHashMap;
use tracemark_core::{Error, LayerId, RequestId, Result, TimeRange};
use tracing::debug;

/// One in-flight fetch: the provisional "requested" marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFetch {
    /// Handle matching the response back to this marking
    pub id: RequestId,
    /// Layer the fetch targets
    pub layer_id: LayerId,
    /// Requested sub-range
    pub range: TimeRange,
}

/// Covered-range bookkeeping for every layer plus the pending set.
#[derive(Debug, Default)]
pub struct RangeCache {
    coverage: FxHashMap<LayerId, CoverageMap>,
    pending: FxHashMap<RequestId, PendingFetch>,
}

impl RangeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uncovered, not-in-flight sub-ranges of `request` for `layer`.
    ///
    /// Fully covered requests (the common pan-within-cached-data case)
    /// return an empty list: zero network calls.
    pub fn check_coverage(&self, layer: LayerId, request: &TimeRange) -> GapList {
        let gaps = match self.coverage.get(&layer) {
            Some(map) => map.gaps(request),
            None => {
                let mut whole = GapList::new();
                if !request.is_empty() {
                    whole.push(*request);
                }
                whole
            }
        };
        if gaps.is_empty() {
            return gaps;
        }

        // Subtract in-flight sub-ranges the same way covered ones are.
        let mut in_flight = CoverageMap::new();
        for p in self.pending.values().filter(|p| p.layer_id == layer) {
            in_flight.record(p.range);
        }
        if in_flight.ranges().is_empty() {
            return gaps;
        }
        gaps.iter().flat_map(|g| in_flight.gaps(g)).collect()
    }

    /// Mark `range` as requested for `layer` and hand back the request
    /// handle the resolution calls must use.
    pub fn begin_fetch(&mut self, layer: LayerId, range: TimeRange) -> RequestId {
        let id = RequestId::new();
        self.pending.insert(
            id,
            PendingFetch {
                id,
                layer_id: layer,
                range,
            },
        );
        debug!(target: "tracemark::cache", request = %id, layer = %layer, range = %range, "fetch begun");
        id
    }

    /// Look up an in-flight fetch by handle.
    pub fn pending_request(&self, id: RequestId) -> Option<&PendingFetch> {
        self.pending.get(&id)
    }

    /// Number of in-flight fetches for `layer`.
    pub fn pending_count(&self, layer: LayerId) -> usize {
        self.pending.values().filter(|p| p.layer_id == layer).count()
    }

    /// Promote a resolved fetch to covered.
    ///
    /// `covered_end` is the upper bound actually retrieved: the requested
    /// end normally, or the truncation clamp when the response was capped
    /// by the page limit. A clamp at or below the requested start records
    /// nothing (the response covered no new ground) but still clears the
    /// pending marking.
    pub fn complete_fetch(&mut self, id: RequestId, covered_end: i64) -> Result<()> {
        let fetch = self.pending.remove(&id).ok_or(Error::UnknownRequest(id))?;
        let end = covered_end.min(fetch.range.end);
        if fetch.range.start < end {
            self.coverage
                .entry(fetch.layer_id)
                .or_default()
                .record(TimeRange {
                    start: fetch.range.start,
                    end,
                });
        }
        debug!(
            target: "tracemark::cache",
            request = %id,
            layer = %fetch.layer_id,
            covered_end = end,
            "fetch completed"
        );
        Ok(())
    }

    /// Discard a failed fetch; its range reverts to uncovered.
    pub fn fail_fetch(&mut self, id: RequestId) -> Result<PendingFetch> {
        let fetch = self.pending.remove(&id).ok_or(Error::UnknownRequest(id))?;
        debug!(
            target: "tracemark::cache",
            request = %id,
            layer = %fetch.layer_id,
            range = %fetch.range,
            "fetch failed; range reverts to uncovered"
        );
        Ok(fetch)
    }

    /// Covered ranges for `layer`, if any were ever recorded.
    pub fn coverage(&self, layer: LayerId) -> Option<&CoverageMap> {
        self.coverage.get(&layer)
    }

    /// Drop coverage and pending state for one layer (session reset).
    pub fn clear_layer(&mut self, layer: LayerId) {
        self.coverage.remove(&layer);
        self.pending.retain(|_, p| p.layer_id != layer);
    }
}
