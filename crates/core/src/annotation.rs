//! Annotation entity
//!
//! One labeled interval on a layer. Within a layer's array annotations are
//! kept sorted ascending by `start`; duplicate starts are permitted (e.g.
//! zero-duration markers at the same instant), so consumers that need a
//! deterministic order break ties by id.

use crate::types::{AnnotationId, LayerId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A labeled time interval attached to a layer.
///
/// `duration` is non-negative once canonicalized; during an interactive
/// drag it may transiently be negative (the edge was dragged past the
/// opposite one). `end` is always derived, never stored independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Server-assigned identifier
    pub id: AnnotationId,
    /// Short display label
    pub label: String,
    /// Longer free-form description
    pub description: String,
    /// Interval lower bound (server timestamp)
    pub start: i64,
    /// Interval length; negative only mid-drag
    pub duration: i64,
    /// Channels the annotation applies to; empty when `all_channels`
    pub channel_ids: Vec<String>,
    /// True when the annotation spans every channel
    pub all_channels: bool,
    /// Owning layer
    pub layer_id: LayerId,
    /// Whether the annotation is the active selection in its layer
    pub selected: bool,
    /// User who created the annotation, when the server reports one
    pub user_id: Option<String>,
    /// Linked package identifier, when the server reports one
    pub linked_package: Option<String>,
}

impl Annotation {
    /// Derived upper bound: `start + duration`.
    pub fn end(&self) -> i64 {
        self.start + self.duration
    }

    /// True when the geometry is in canonical form (`duration >= 0`).
    pub fn is_canonical(&self) -> bool {
        self.duration >= 0
    }

    /// Normalize a transiently inverted interval so `start` is the smaller
    /// timestamp and `duration` its absolute value. The set of covered
    /// instants (and therefore the derived `end`) is unchanged.
    pub fn canonicalize(&mut self) {
        if self.duration < 0 {
            self.start += self.duration;
            self.duration = -self.duration;
        }
    }

    /// Ordering used for layer arrays: ascending by `start`, ties by id.
    pub fn cmp_by_start(&self, other: &Annotation) -> Ordering {
        self.start
            .cmp(&other.start)
            .then(self.id.cmp(&other.id))
    }
}
