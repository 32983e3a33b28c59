//! Wire payload boundary
//!
//! One explicit parse/validate layer over the server response for
//! `GET …/timeseries/{viewer}/layers/{layer}/annotations`. Everything past
//! this module works with typed [`Annotation`] values; loosely-shaped
//! payload handling never leaks downstream.
//!
//! Malformed items are defensively defaulted rather than rejected: a
//! partial render is preferable to blocking the whole viewport. Each
//! defaulted field is logged at `warn`.

use crate::annotation::Annotation;
use crate::error::Result;
use crate::types::{AnnotationId, LayerId};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

/// Top-level response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationPage {
    /// Nested results envelope
    #[serde(default)]
    pub annotations: ResultsEnvelope,
    /// Packages linked from the returned annotations, keyed by package id
    #[serde(default, rename = "linkedPackages")]
    pub linked_packages: Map<String, Value>,
}

/// The `annotations.results` wrapper the server nests items under.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsEnvelope {
    /// Raw annotation items in server order
    #[serde(default)]
    pub results: Vec<RawAnnotation>,
}

/// One annotation item as the server serializes it. All fields optional;
/// [`RawAnnotation::normalize`] applies the defaulting policy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnnotation {
    /// Server id
    pub id: Option<i64>,
    /// Display label
    pub label: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Interval lower bound
    pub start: Option<i64>,
    /// Interval upper bound (the wire carries end, not duration)
    pub end: Option<i64>,
    /// Channels the annotation applies to
    pub channel_ids: Option<Vec<String>>,
    /// Owning layer id as reported by the server
    pub layer_id: Option<i64>,
    /// Creating user
    pub user_id: Option<String>,
    /// Linked package identifier
    pub linked_package: Option<String>,
}

impl AnnotationPage {
    /// Parse a response body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Parse an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl RawAnnotation {
    /// Convert a raw item into a typed [`Annotation`].
    ///
    /// `fallback_layer` is the layer the response was fetched for; it wins
    /// when the item omits `layerId`. Missing geometry defaults to a
    /// zero-duration marker at 0 and is logged, never fatal.
    pub fn normalize(self, fallback_layer: LayerId) -> Annotation {
        if self.id.is_none() || self.start.is_none() || self.end.is_none() {
            warn!(
                target: "tracemark::payload",
                id = ?self.id,
                start = ?self.start,
                end = ?self.end,
                "annotation item missing required fields; applying defaults"
            );
        }
        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(start);
        let channel_ids = self.channel_ids.unwrap_or_default();
        Annotation {
            id: AnnotationId(self.id.unwrap_or(0)),
            label: self.label.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            start,
            // inverted wire geometry is clamped, not trusted
            duration: (end - start).max(0),
            all_channels: channel_ids.is_empty(),
            channel_ids,
            layer_id: self.layer_id.map(LayerId).unwrap_or(fallback_layer),
            selected: false,
            user_id: self.user_id,
            linked_package: self.linked_package,
        }
    }
}
