//! Engine configuration

use serde::{Deserialize, Serialize};

/// Maximum items the server returns per annotation query.
pub const DEFAULT_PAGE_LIMIT: usize = 500;

/// Pixel distance within which a pointer grabs an annotation edge.
pub const DEFAULT_EDGE_TOLERANCE_PX: f32 = 5.0;

/// Tunables and identity for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Viewer the annotation queries are scoped to
    pub viewer_id: String,
    /// Page cap used both in queries and for truncation detection
    pub page_limit: usize,
    /// Resize-affordance tolerance around annotation edges
    pub edge_tolerance_px: f32,
}

impl EngineConfig {
    /// Config for `viewer_id` with default tunables.
    pub fn new(viewer_id: impl Into<String>) -> Self {
        Self {
            viewer_id: viewer_id.into(),
            page_limit: DEFAULT_PAGE_LIMIT,
            edge_tolerance_px: DEFAULT_EDGE_TOLERANCE_PX,
        }
    }
}
