//! In-memory layer store and viewport projection
//!
//! Owns the per-layer annotation arrays the rest of the engine mutates,
//! enforcing the sorted-by-start invariant, and projects the visible
//! annotations into the left-sorted render list hit-testing consumes.

use tracemark_core::{Annotation, AnnotationId, Layer, LayerId};
use tracing::debug;

/// How the viewport maps time to screen space, plus the label lane the
/// pointer interacts with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// Timestamp rendered at x = 0
    pub start_time: i64,
    /// Time units represented by one horizontal pixel
    pub time_per_px: f64,
    /// Viewport width
    pub width_px: f32,
    /// Top of the annotation label lane
    pub lane_top: f32,
    /// Bottom of the annotation label lane
    pub lane_bottom: f32,
}

impl ViewportMetrics {
    /// Horizontal screen position of a timestamp.
    pub fn time_to_x(&self, t: i64) -> f32 {
        ((t - self.start_time) as f64 / self.time_per_px) as f32
    }

    /// Time delta represented by a horizontal pixel delta.
    pub fn px_to_time(&self, dx: f32) -> i64 {
        (dx as f64 * self.time_per_px).round() as i64
    }

    /// Is the pointer vertically inside the label lane?
    pub fn in_lane(&self, y: f32) -> bool {
        self.lane_top <= y && y <= self.lane_bottom
    }
}

/// One annotation projected to screen space, input to hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedAnnotation {
    /// Projected annotation
    pub id: AnnotationId,
    /// Layer it belongs to
    pub layer_id: LayerId,
    /// Screen-left edge
    pub left_px: f32,
    /// Screen-right edge (>= left even mid-drag)
    pub right_px: f32,
}

/// What a merge changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// Annotations newly added
    pub added: usize,
    /// Annotations already present (by id) and replaced in place
    pub replaced: usize,
}

/// The layers currently loaded in the viewer, in display order.
#[derive(Debug, Default)]
pub struct LayerStore {
    layers: Vec<Layer>,
}

impl LayerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer (display order is insertion order).
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Remove a layer by id, returning it when present.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let idx = self.layers.iter().position(|l| l.id == Some(id))?;
        Some(self.layers.remove(idx))
    }

    /// All layers in display order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// All layers, mutably.
    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == Some(id))
    }

    /// Layer by id, mutably.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == Some(id))
    }

    /// Annotation by (layer, id), mutably.
    pub fn annotation_mut(
        &mut self,
        layer_id: LayerId,
        id: AnnotationId,
    ) -> Option<&mut Annotation> {
        self.layer_mut(layer_id)?.annotation_mut(id)
    }

    /// Merge fetched annotations into their layer, deduplicating by id so
    /// overlapping fetches stay idempotent. Existing entries are replaced
    /// in place (their selection flag survives); the array is re-sorted.
    pub fn merge_annotations(
        &mut self,
        layer_id: LayerId,
        incoming: Vec<Annotation>,
    ) -> Option<MergeStats> {
        let layer = self.layer_mut(layer_id)?;
        let mut stats = MergeStats::default();
        for mut ann in incoming {
            match layer.annotation_mut(ann.id) {
                Some(existing) => {
                    ann.selected = existing.selected;
                    *existing = ann;
                    stats.replaced += 1;
                }
                None => {
                    layer.annotations.push(ann);
                    stats.added += 1;
                }
            }
        }
        layer.sort_annotations();
        debug!(
            target: "tracemark::store",
            layer = %layer_id,
            added = stats.added,
            replaced = stats.replaced,
            "merged fetched annotations"
        );
        Some(stats)
    }

    /// Next annotation strictly after `time` across visible layers.
    /// The earliest candidate wins; ties go to the earlier layer.
    pub fn find_next(&self, time: i64) -> Option<&Annotation> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .filter_map(|l| {
                tracemark_index::find_next(&l.annotations, time).map(|i| &l.annotations[i])
            })
            .min_by_key(|a| a.start)
    }

    /// Previous annotation strictly before `time` across visible layers.
    /// The latest candidate wins; ties go to the earlier layer.
    pub fn find_previous(&self, time: i64) -> Option<&Annotation> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .filter_map(|l| {
                tracemark_index::find_previous(&l.annotations, time).map(|i| &l.annotations[i])
            })
            // strict comparison keeps the first maximal candidate, matching
            // min_by_key's tie behavior in find_next
            .reduce(|best, cand| if cand.start > best.start { cand } else { best })
    }

    /// Project visible layers into the render list: on-screen annotations
    /// only, sorted by left edge. A transiently inverted annotation
    /// projects with its edges swapped so the list invariant holds
    /// mid-drag.
    pub fn render_list(&self, metrics: &ViewportMetrics) -> Vec<RenderedAnnotation> {
        let mut out = Vec::new();
        for layer in self.layers.iter().filter(|l| l.visible) {
            for ann in &layer.annotations {
                let a = metrics.time_to_x(ann.start);
                let b = metrics.time_to_x(ann.end());
                let (left, right) = if a <= b { (a, b) } else { (b, a) };
                if right < 0.0 || left > metrics.width_px {
                    continue;
                }
                out.push(RenderedAnnotation {
                    id: ann.id,
                    layer_id: ann.layer_id,
                    left_px: left,
                    right_px: right,
                });
            }
        }
        out.sort_by(|a, b| a.left_px.total_cmp(&b.left_px));
        out
    }
}
