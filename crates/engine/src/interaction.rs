//! Pointer interaction state machine
//!
//! Drives hover, selection, and drag-resize of the annotations currently
//! on screen. Hit-testing is spatial, over the render-projected list
//! (sorted by left edge), never over the temporal index.
//!
//! A drag holds a `{old_start, old_duration}` snapshot. On release the
//! tentative geometry is canonicalized (an edge dragged past the opposite
//! one swaps) and committed; losing focus mid-drag rolls the snapshot
//! back instead of leaving a half-edited annotation in the layer array.

use crate::store::{LayerStore, RenderedAnnotation, ViewportMetrics};
use tracemark_core::{Annotation, AnnotationId, LayerId};
use tracing::debug;

/// Which edge of an annotation a drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEdge {
    /// Start edge; dragging it keeps the end fixed
    Left,
    /// End edge; dragging it keeps the start fixed
    Right,
}

/// What the pointer is positioned to do with a hovered annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// Over the body: release selects
    Body,
    /// Within edge tolerance: press starts a resize
    Resize(DragEdge),
}

/// Pointer mode for cursor styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMode {
    /// Nothing under the pointer
    Default,
    /// Hovering a selectable annotation body
    Select,
    /// Hovering an edge, or actively resizing
    ResizeHorizontal,
}

/// Explicit result of one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerUpdate {
    /// Mode for cursor styling
    pub mode: PointerMode,
    /// Finalized annotation the host should persist, set on drag release
    pub committed: Option<Annotation>,
    /// Annotation that became the active selection, set on select release
    pub selected: Option<AnnotationId>,
}

impl PointerUpdate {
    fn idle() -> Self {
        Self {
            mode: PointerMode::Default,
            committed: None,
            selected: None,
        }
    }

    fn mode(mode: PointerMode) -> Self {
        Self {
            mode,
            committed: None,
            selected: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerState {
    Idle,
    Hovering {
        id: AnnotationId,
        layer_id: LayerId,
        affordance: Affordance,
    },
    Dragging {
        id: AnnotationId,
        layer_id: LayerId,
        edge: DragEdge,
        press_x: f32,
        old_start: i64,
        old_duration: i64,
    },
}

/// The hover/select/drag state machine.
#[derive(Debug)]
pub struct InteractionController {
    state: PointerState,
    edge_tolerance_px: f32,
}

impl InteractionController {
    /// Controller with the given edge-grab tolerance.
    pub fn new(edge_tolerance_px: f32) -> Self {
        Self {
            state: PointerState::Idle,
            edge_tolerance_px,
        }
    }

    /// Is a drag in progress?
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging { .. })
    }

    /// Spatial hit-test: lane pre-check, then a horizontal scan that
    /// stops at the first candidate whose left edge is past the pointer
    /// (the list is left-sorted, later entries cannot match). Edge
    /// proximity wins over a body hit; the first matching annotation in
    /// list order wins overall.
    fn hit_test(
        &self,
        x: f32,
        y: f32,
        metrics: &ViewportMetrics,
        render: &[RenderedAnnotation],
    ) -> Option<(RenderedAnnotation, Affordance)> {
        if !metrics.in_lane(y) {
            return None;
        }
        let tol = self.edge_tolerance_px;
        for r in render {
            if r.left_px > x + tol {
                break;
            }
            if (x - r.left_px).abs() <= tol {
                return Some((*r, Affordance::Resize(DragEdge::Left)));
            }
            if (x - r.right_px).abs() <= tol {
                return Some((*r, Affordance::Resize(DragEdge::Right)));
            }
            if r.left_px < x && x < r.right_px {
                return Some((*r, Affordance::Body));
            }
        }
        None
    }

    /// Pointer moved without a button held: refresh the hover state.
    /// While dragging, apply the cumulative delta as tentative geometry.
    pub fn pointer_move(
        &mut self,
        x: f32,
        y: f32,
        metrics: &ViewportMetrics,
        render: &[RenderedAnnotation],
        store: &mut LayerStore,
    ) -> PointerUpdate {
        if let PointerState::Dragging {
            id,
            layer_id,
            edge,
            press_x,
            old_start,
            old_duration,
        } = self.state
        {
            let delta_t = metrics.px_to_time(x - press_x);
            let Some(layer) = store.layer_mut(layer_id) else {
                self.state = PointerState::Idle;
                return PointerUpdate::idle();
            };
            let Some(ann) = layer.annotation_mut(id) else {
                // target vanished mid-drag; nothing left to restore
                self.state = PointerState::Idle;
                return PointerUpdate::idle();
            };
            match edge {
                DragEdge::Left => {
                    // right edge stays fixed
                    ann.start = old_start + delta_t;
                    ann.duration = old_duration - delta_t;
                }
                DragEdge::Right => {
                    ann.duration = old_duration + delta_t;
                }
            }
            // navigation binary-searches this array; keep it sorted even
            // while the geometry is tentative
            layer.sort_annotations();
            return PointerUpdate::mode(PointerMode::ResizeHorizontal);
        }

        match self.hit_test(x, y, metrics, render) {
            Some((hit, affordance)) => {
                self.state = PointerState::Hovering {
                    id: hit.id,
                    layer_id: hit.layer_id,
                    affordance,
                };
                let mode = match affordance {
                    Affordance::Body => PointerMode::Select,
                    Affordance::Resize(_) => PointerMode::ResizeHorizontal,
                };
                PointerUpdate::mode(mode)
            }
            None => {
                self.state = PointerState::Idle;
                PointerUpdate::idle()
            }
        }
    }

    /// Button pressed: a resize affordance arms a drag and snapshots the
    /// geometry for rollback.
    pub fn pointer_down(
        &mut self,
        x: f32,
        _y: f32,
        store: &LayerStore,
    ) -> PointerUpdate {
        if let PointerState::Hovering {
            id,
            layer_id,
            affordance: Affordance::Resize(edge),
        } = self.state
        {
            if let Some(ann) = store.layer(layer_id).and_then(|l| l.annotation(id)) {
                self.state = PointerState::Dragging {
                    id,
                    layer_id,
                    edge,
                    press_x: x,
                    old_start: ann.start,
                    old_duration: ann.duration,
                };
                debug!(
                    target: "tracemark::interaction",
                    annotation = %id,
                    ?edge,
                    "drag started"
                );
                return PointerUpdate::mode(PointerMode::ResizeHorizontal);
            }
        }
        let mode = match self.state {
            PointerState::Hovering {
                affordance: Affordance::Body,
                ..
            } => PointerMode::Select,
            _ => PointerMode::Default,
        };
        PointerUpdate::mode(mode)
    }

    /// Button released: commit a drag (canonicalized), or commit a
    /// selection on a hovered body.
    pub fn pointer_up(&mut self, store: &mut LayerStore) -> PointerUpdate {
        match self.state {
            PointerState::Dragging { id, layer_id, .. } => {
                self.state = PointerState::Idle;
                let Some(layer) = store.layer_mut(layer_id) else {
                    return PointerUpdate::idle();
                };
                let committed = match layer.annotation_mut(id) {
                    Some(ann) => {
                        ann.canonicalize();
                        let snapshot = ann.clone();
                        layer.sort_annotations();
                        Some(snapshot)
                    }
                    None => None,
                };
                if let Some(ann) = &committed {
                    debug!(
                        target: "tracemark::interaction",
                        annotation = %ann.id,
                        start = ann.start,
                        duration = ann.duration,
                        "drag committed"
                    );
                }
                PointerUpdate {
                    mode: PointerMode::Default,
                    committed,
                    selected: None,
                }
            }
            PointerState::Hovering {
                id,
                layer_id,
                affordance: Affordance::Body,
            } => {
                if let Some(layer) = store.layer_mut(layer_id) {
                    layer.select_only(id);
                }
                PointerUpdate {
                    mode: PointerMode::Select,
                    committed: None,
                    selected: Some(id),
                }
            }
            _ => PointerUpdate::mode(self.mode_for_state()),
        }
    }

    /// Pointer left the viewer (or focus was lost). A drag in progress
    /// rolls back to its snapshot.
    pub fn pointer_leave(&mut self, store: &mut LayerStore) -> PointerUpdate {
        if let PointerState::Dragging {
            id,
            layer_id,
            old_start,
            old_duration,
            ..
        } = self.state
        {
            if let Some(layer) = store.layer_mut(layer_id) {
                if let Some(ann) = layer.annotation_mut(id) {
                    ann.start = old_start;
                    ann.duration = old_duration;
                }
                layer.sort_annotations();
            }
            debug!(
                target: "tracemark::interaction",
                annotation = %id,
                "drag rolled back on focus loss"
            );
        }
        self.state = PointerState::Idle;
        PointerUpdate::idle()
    }

    fn mode_for_state(&self) -> PointerMode {
        match self.state {
            PointerState::Idle => PointerMode::Default,
            PointerState::Hovering {
                affordance: Affordance::Body,
                ..
            } => PointerMode::Select,
            PointerState::Hovering { .. } | PointerState::Dragging { .. } => {
                PointerMode::ResizeHorizontal
            }
        }
    }
}
