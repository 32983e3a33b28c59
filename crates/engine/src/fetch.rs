//! Fetch orchestration
//!
//! Thin orchestration over the transport seam: plan the uncovered gaps
//! for each fetchable layer, normalize raw pages into typed annotations,
//! merge them into the store, and record the resulting coverage.
//!
//! Hosts with their own event loop use the split-phase API
//! ([`AnnotationFetcher::plan`] then [`AnnotationFetcher::apply_response`]
//! / [`AnnotationFetcher::fail`] per request); [`AnnotationFetcher::fill`]
//! is the one-call driver for hosts that let the engine call the
//! transport directly. Either way the pending set in the cache keeps
//! overlapping passes from requesting the same sub-range twice, and the
//! merge is idempotent, so late responses never clobber earlier ones.

use crate::store::LayerStore;
use crate::transport::{AnnotationQuery, AnnotationTransport, AuthToken, TokenProvider};
use tracemark_cache::{PendingFetch, RangeCache};
use tracemark_core::{AnnotationPage, Error, LayerId, RequestId, Result, TimeRange};
use tracing::{debug, warn};

/// Plans and resolves annotation fetches.
#[derive(Debug, Clone)]
pub struct AnnotationFetcher {
    viewer_id: String,
    page_limit: usize,
}

/// What one applied response did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Annotations newly added to the layer
    pub added: usize,
    /// Annotations replaced in place (already known by id)
    pub replaced: usize,
    /// Upper bound recorded as covered
    pub covered_end: i64,
    /// True when the response was capped by the page limit
    pub truncated: bool,
}

/// Summary of one fill pass across all fetchable layers.
#[derive(Debug, Default)]
pub struct FillReport {
    /// Requests issued this pass
    pub requested: usize,
    /// Responses merged successfully
    pub merged: usize,
    /// Per-layer failures; other layers proceed independently
    pub failures: Vec<(LayerId, Error)>,
}

impl AnnotationFetcher {
    /// Fetcher scoped to one viewer.
    pub fn new(viewer_id: impl Into<String>, page_limit: usize) -> Self {
        Self {
            viewer_id: viewer_id.into(),
            page_limit,
        }
    }

    /// Compute the gaps of `request` for every visible, persisted layer
    /// and mark each as requested. Layers without an id are logged and
    /// skipped; hidden layers are not fetched.
    pub fn plan(
        &self,
        store: &LayerStore,
        cache: &mut RangeCache,
        request: TimeRange,
    ) -> Vec<PendingFetch> {
        let mut planned = Vec::new();
        for layer in store.layers().iter().filter(|l| l.visible) {
            let layer_id = match layer.id {
                Some(id) => id,
                None => {
                    warn!(
                        target: "tracemark::fetch",
                        layer_name = %layer.name,
                        "layer has no id; skipping fetch"
                    );
                    continue;
                }
            };
            for gap in cache.check_coverage(layer_id, &request) {
                let id = cache.begin_fetch(layer_id, gap);
                planned.push(PendingFetch {
                    id,
                    layer_id,
                    range: gap,
                });
            }
        }
        debug!(
            target: "tracemark::fetch",
            request = %request,
            planned = planned.len(),
            "planned gap fetches"
        );
        planned
    }

    /// Build the transport query for a planned request.
    pub fn query(&self, fetch: &PendingFetch, api_key: AuthToken) -> AnnotationQuery {
        AnnotationQuery {
            viewer_id: self.viewer_id.clone(),
            layer_id: fetch.layer_id,
            range: fetch.range,
            limit: self.page_limit,
            api_key,
        }
    }

    /// Normalize and merge a resolved page, then promote the request's
    /// range to covered.
    ///
    /// Truncation: a page at the cap covers only up to the `start` of the
    /// last item actually retrieved, so the recorded upper bound clamps
    /// there and a later check re-requests the remainder without
    /// re-fetching what was already seen. Zero-result pages still cover
    /// their full queried sub-range ("no data" is not "not checked").
    pub fn apply_response(
        &self,
        store: &mut LayerStore,
        cache: &mut RangeCache,
        request_id: RequestId,
        page: AnnotationPage,
    ) -> Result<MergeOutcome> {
        let fetch = *cache
            .pending_request(request_id)
            .ok_or(Error::UnknownRequest(request_id))?;

        let mut annotations: Vec<_> = page
            .annotations
            .results
            .into_iter()
            .map(|raw| raw.normalize(fetch.layer_id))
            .collect();
        annotations.sort_by(|a, b| a.cmp_by_start(b));

        let truncated = annotations.len() >= self.page_limit;
        let covered_end = if truncated {
            // last item is the max start after the sort above
            annotations.last().map(|a| a.start).unwrap_or(fetch.range.end)
        } else {
            fetch.range.end
        };

        let stats = match store.merge_annotations(fetch.layer_id, annotations) {
            Some(stats) => stats,
            None => {
                // layer vanished between plan and resolve; drop the marking
                cache.fail_fetch(request_id)?;
                return Err(Error::UnknownLayer(fetch.layer_id));
            }
        };
        cache.complete_fetch(request_id, covered_end)?;

        Ok(MergeOutcome {
            added: stats.added,
            replaced: stats.replaced,
            covered_end,
            truncated,
        })
    }

    /// Revert a failed request; its range becomes fetchable again.
    pub fn fail(&self, cache: &mut RangeCache, request_id: RequestId, error: &Error) {
        warn!(
            target: "tracemark::fetch",
            request = %request_id,
            error = %error,
            "annotation fetch failed"
        );
        // Unknown ids mean the request already resolved; nothing to undo.
        let _ = cache.fail_fetch(request_id);
    }

    /// One-call driver: plan the pass, run every request through the
    /// transport, and resolve each. Transport failures are collected per
    /// layer; a token failure aborts before any request is issued.
    pub fn fill(
        &self,
        store: &mut LayerStore,
        cache: &mut RangeCache,
        request: TimeRange,
        tokens: &dyn TokenProvider,
        transport: &dyn AnnotationTransport,
    ) -> Result<FillReport> {
        let planned = self.plan(store, cache, request);
        let mut report = FillReport {
            requested: planned.len(),
            ..FillReport::default()
        };
        if planned.is_empty() {
            return Ok(report);
        }

        let api_key = match tokens.token() {
            Ok(token) => token,
            Err(err) => {
                // nothing was sent; unwind the provisional markings
                for fetch in &planned {
                    let _ = cache.fail_fetch(fetch.id);
                }
                return Err(err);
            }
        };

        for fetch in planned {
            let query = self.query(&fetch, api_key.clone());
            match transport.fetch_annotations(&query) {
                Ok(page) => {
                    self.apply_response(store, cache, fetch.id, page)?;
                    report.merged += 1;
                }
                Err(err) => {
                    self.fail(cache, fetch.id, &err);
                    report.failures.push((fetch.layer_id, err));
                }
            }
        }
        Ok(report)
    }
}
