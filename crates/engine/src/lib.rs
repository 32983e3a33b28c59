//! Annotation engine: fetch orchestration and pointer interaction
//!
//! The pieces the surrounding viewer talks to:
//! - Transport seam: [`TokenProvider`] and [`AnnotationTransport`] traits
//!   the host implements over its HTTP stack
//! - [`LayerStore`]: the in-memory layer/annotation arrays and their
//!   sorted-merge discipline
//! - [`AnnotationFetcher`]: gap planning, payload normalization, merge and
//!   coverage recording (with page-cap truncation clamping)
//! - [`InteractionController`]: the hover/select/drag pointer state
//!   machine with snapshot rollback
//! - [`AnnotationEngine`]: facade owning all of the above
//!
//! All state lives in explicit instances; every operation surfaces its
//! effect through a return value.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod fetch;
pub mod interaction;
pub mod store;
pub mod transport;

pub use config::EngineConfig;
pub use engine::AnnotationEngine;
pub use fetch::{AnnotationFetcher, FillReport, MergeOutcome};
pub use interaction::{
    Affordance, DragEdge, InteractionController, PointerMode, PointerUpdate,
};
pub use store::{LayerStore, MergeStats, RenderedAnnotation, ViewportMetrics};
pub use transport::{AnnotationQuery, AnnotationTransport, AuthToken, TokenProvider};
