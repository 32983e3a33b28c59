//! Transport seam
//!
//! Token retrieval and the HTTP transport are external collaborators.
//! The engine drives them through these traits and never blocks on
//! anything else; timeouts and retries are the host's concern.

use tracemark_core::{AnnotationPage, LayerId, Result, TimeRange};

/// Bearer token for the annotation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken(pub String);

/// Supplies an auth token, typically from the host's session layer.
/// The engine proceeds with a fill pass only once a token resolves.
pub trait TokenProvider {
    /// Current token, or an auth error.
    fn token(&self) -> Result<AuthToken>;
}

/// One annotation query, scoped to a viewer and layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationQuery {
    /// Viewer the query is scoped to
    pub viewer_id: String,
    /// Target layer
    pub layer_id: LayerId,
    /// Requested sub-range
    pub range: TimeRange,
    /// Page cap; responses at the cap are treated as truncated
    pub limit: usize,
    /// Token for the `api_key` parameter
    pub api_key: AuthToken,
}

impl AnnotationQuery {
    /// Request path relative to the API base, for hosts that build the
    /// URL directly.
    pub fn request_path(&self) -> String {
        format!(
            "timeseries/{}/layers/{}/annotations?start={}&end={}&layerId={}&limit={}&api_key={}",
            self.viewer_id,
            self.layer_id.0,
            self.range.start,
            self.range.end,
            self.layer_id.0,
            self.limit,
            self.api_key.0,
        )
    }
}

/// Executes annotation queries against the server.
pub trait AnnotationTransport {
    /// Fetch one page of annotations for `query`.
    fn fetch_annotations(&self, query: &AnnotationQuery) -> Result<AnnotationPage>;
}
