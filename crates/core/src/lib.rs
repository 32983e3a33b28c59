//! Core types for the tracemark annotation engine
//!
//! This crate defines the foundational types used throughout the system:
//! - AnnotationId / LayerId / RequestId: identifier newtypes
//! - TimeRange: half-open `[start, end)` interval over server timestamps
//! - Annotation: one labeled interval on a layer
//! - Layer: a named, colored grouping of annotations
//! - LayerColor: parsed hex color with hover/fill variants
//! - payload: the serde boundary over the server wire format
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod annotation;
pub mod color;
pub mod error;
pub mod layer;
pub mod payload;
pub mod time;
pub mod types;

pub use annotation::Annotation;
pub use color::{LayerColor, Rgba};
pub use error::{Error, Result};
pub use layer::Layer;
pub use payload::{AnnotationPage, RawAnnotation, ResultsEnvelope};
pub use time::TimeRange;
pub use types::{AnnotationId, LayerId, RequestId};
