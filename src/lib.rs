//! tracemark: client-side annotation engine for time-indexed data viewers
//!
//! The crate bundles the member crates behind one facade:
//! - [`tracemark_core`] — domain types, errors, the wire-payload boundary
//! - [`tracemark_index`] — duplicate-tolerant binary search and temporal
//!   navigation over sorted annotation arrays
//! - [`tracemark_cache`] — per-layer covered-range tracking with gap
//!   computation and in-flight request deduplication
//! - [`tracemark_engine`] — fetch orchestration, the pointer interaction
//!   state machine, and the [`AnnotationEngine`] facade
//!
//! A host embeds [`AnnotationEngine`], implements the two transport
//! traits over its HTTP stack, and feeds it viewport changes and pointer
//! events; every operation reports its effect through a return value.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use tracemark_core::{
    Annotation, AnnotationId, AnnotationPage, Error, Layer, LayerColor, LayerId, RawAnnotation,
    RequestId, Result, ResultsEnvelope, Rgba, TimeRange,
};

pub use tracemark_index::{find_next, find_previous, index_of, Bias, Lookup};

pub use tracemark_cache::{CoverageMap, GapList, PendingFetch, RangeCache};

pub use tracemark_engine::{
    Affordance, AnnotationEngine, AnnotationFetcher, AnnotationQuery, AnnotationTransport,
    AuthToken, DragEdge, EngineConfig, FillReport, InteractionController, LayerStore, MergeOutcome,
    MergeStats, PointerMode, PointerUpdate, RenderedAnnotation, TokenProvider, ViewportMetrics,
};
