//! Engine facade
//!
//! One explicit instance owning all mutable state: the layer store, the
//! range cache, the interaction controller, and the viewport metrics the
//! pointer events are interpreted against.

use crate::config::EngineConfig;
use crate::fetch::{AnnotationFetcher, FillReport, MergeOutcome};
use crate::interaction::{InteractionController, PointerUpdate};
use crate::store::{LayerStore, RenderedAnnotation, ViewportMetrics};
use crate::transport::{AnnotationTransport, TokenProvider};
use tracemark_cache::{PendingFetch, RangeCache};
use tracemark_core::{
    Annotation, AnnotationPage, Error, Layer, LayerId, RequestId, Result, TimeRange,
};

/// Client-side annotation engine for a time-indexed viewer.
#[derive(Debug)]
pub struct AnnotationEngine {
    store: LayerStore,
    cache: RangeCache,
    fetcher: AnnotationFetcher,
    controller: InteractionController,
    metrics: ViewportMetrics,
}

impl AnnotationEngine {
    /// Build an engine; `metrics` describes the initial viewport.
    pub fn new(config: EngineConfig, metrics: ViewportMetrics) -> Self {
        Self {
            store: LayerStore::new(),
            cache: RangeCache::new(),
            fetcher: AnnotationFetcher::new(config.viewer_id.clone(), config.page_limit),
            controller: InteractionController::new(config.edge_tolerance_px),
            metrics,
        }
    }

    /// The layer store (read access for rendering).
    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    /// Add a layer produced by the external CRUD flow.
    pub fn add_layer(&mut self, layer: Layer) {
        self.store.add_layer(layer);
    }

    /// Remove a layer and forget its coverage.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        self.cache.clear_layer(id);
        self.store.remove_layer(id)
    }

    /// Toggle a layer's visibility.
    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> Result<()> {
        let layer = self.store.layer_mut(id).ok_or(Error::UnknownLayer(id))?;
        layer.visible = visible;
        Ok(())
    }

    /// Update the viewport mapping used by pointer events and rendering.
    pub fn set_viewport(&mut self, metrics: ViewportMetrics) {
        self.metrics = metrics;
    }

    /// The current render-projected annotation list, left-sorted.
    pub fn render_list(&self) -> Vec<RenderedAnnotation> {
        self.store.render_list(&self.metrics)
    }

    /// Fill every uncovered gap of `[start, end)` across fetchable
    /// layers, driving the host's transport synchronously.
    pub fn check_annotation_range(
        &mut self,
        start: i64,
        end: i64,
        tokens: &dyn TokenProvider,
        transport: &dyn AnnotationTransport,
    ) -> Result<FillReport> {
        let request = TimeRange::new(start, end)?;
        self.fetcher
            .fill(&mut self.store, &mut self.cache, request, tokens, transport)
    }

    /// Split-phase variant: mark and return the requests the host should
    /// issue on its own event loop.
    pub fn plan_requests(&mut self, start: i64, end: i64) -> Result<Vec<PendingFetch>> {
        let request = TimeRange::new(start, end)?;
        Ok(self.fetcher.plan(&self.store, &mut self.cache, request))
    }

    /// Resolve one planned request with its (already parsed) page.
    pub fn apply_response(
        &mut self,
        request_id: RequestId,
        page: AnnotationPage,
    ) -> Result<MergeOutcome> {
        self.fetcher
            .apply_response(&mut self.store, &mut self.cache, request_id, page)
    }

    /// Resolve one planned request as failed; its range becomes
    /// fetchable again on the next coverage check.
    pub fn fail_request(&mut self, request_id: RequestId, error: &Error) {
        self.fetcher.fail(&mut self.cache, request_id, error);
    }

    /// Next annotation strictly after `time` across visible layers.
    pub fn find_next_annotation(&self, time: i64) -> Option<&Annotation> {
        self.store.find_next(time)
    }

    /// Previous annotation strictly before `time` across visible layers.
    pub fn find_previous_annotation(&self, time: i64) -> Option<&Annotation> {
        self.store.find_previous(time)
    }

    /// Pointer moved; returns the mode for cursor styling.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> PointerUpdate {
        let render = self.store.render_list(&self.metrics);
        self.controller
            .pointer_move(x, y, &self.metrics, &render, &mut self.store)
    }

    /// Pointer button pressed.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> PointerUpdate {
        self.controller.pointer_down(x, y, &self.store)
    }

    /// Pointer button released; `committed` carries a finalized edit.
    pub fn pointer_up(&mut self) -> PointerUpdate {
        self.controller.pointer_up(&mut self.store)
    }

    /// Pointer left the viewer; a drag in progress rolls back.
    pub fn pointer_leave(&mut self) -> PointerUpdate {
        self.controller.pointer_leave(&mut self.store)
    }
}
