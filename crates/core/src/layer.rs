//! Annotation layers
//!
//! A layer groups annotations under one name and color. Layer CRUD itself
//! is an external concern; this type only owns the annotation array the
//! engine mutates and the identity/visibility it reads.

use crate::annotation::Annotation;
use crate::color::LayerColor;
use crate::types::{AnnotationId, LayerId};
use serde::{Deserialize, Serialize};

/// A named, colored grouping of annotations.
///
/// `id` is `None` for a layer that has not been persisted yet (the
/// external create flow assigns ids). Such layers render locally but are
/// skipped by fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Server-assigned id, or None before the layer is persisted
    pub id: Option<LayerId>,
    /// Display name
    pub name: String,
    /// Styling variants
    pub color: LayerColor,
    /// Annotations, sorted ascending by start (ties by id)
    pub annotations: Vec<Annotation>,
    /// Whether the layer is currently drawn
    pub visible: bool,
    /// Whether the layer is the active layer in the UI
    pub selected: bool,
}

impl Layer {
    /// Create an empty, visible layer.
    pub fn new(id: Option<LayerId>, name: impl Into<String>, color: LayerColor) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            annotations: Vec::new(),
            visible: true,
            selected: false,
        }
    }

    /// Restore the sort invariant after a mutation that may have moved an
    /// annotation out of place.
    pub fn sort_annotations(&mut self) {
        self.annotations.sort_by(|a, b| a.cmp_by_start(b));
    }

    /// Find an annotation by id.
    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Find an annotation by id, mutably.
    pub fn annotation_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// Mark `id` as the active selection and deselect the rest.
    pub fn select_only(&mut self, id: AnnotationId) {
        for a in &mut self.annotations {
            a.selected = a.id == id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(id: i64, start: i64) -> Annotation {
        Annotation {
            id: AnnotationId(id),
            label: String::new(),
            description: String::new(),
            start,
            duration: 0,
            channel_ids: Vec::new(),
            all_channels: true,
            layer_id: LayerId(1),
            selected: false,
            user_id: None,
            linked_package: None,
        }
    }

    fn layer() -> Layer {
        Layer::new(
            Some(LayerId(1)),
            "test",
            LayerColor::from_hex("#112233").unwrap(),
        )
    }

    #[test]
    fn test_sort_restores_invariant() {
        let mut l = layer();
        l.annotations = vec![ann(3, 30), ann(1, 10), ann(2, 10)];
        l.sort_annotations();
        let starts: Vec<i64> = l.annotations.iter().map(|a| a.start).collect();
        assert_eq!(starts, vec![10, 10, 30]);
        // duplicate starts tie-break by id
        assert_eq!(l.annotations[0].id, AnnotationId(1));
        assert_eq!(l.annotations[1].id, AnnotationId(2));
    }

    #[test]
    fn test_select_only() {
        let mut l = layer();
        l.annotations = vec![ann(1, 10), ann(2, 20), ann(3, 30)];
        l.annotations[0].selected = true;
        l.select_only(AnnotationId(2));
        let selected: Vec<bool> = l.annotations.iter().map(|a| a.selected).collect();
        assert_eq!(selected, vec![false, true, false]);
    }
}
