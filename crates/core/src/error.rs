//! Error types for the tracemark engine
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::{LayerId, RequestId};
use thiserror::Error;

/// Result type alias for tracemark operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the annotation engine
#[derive(Debug, Error)]
pub enum Error {
    /// Fetch failed at the transport level. The affected sub-range reverts
    /// to uncovered, so a later coverage check retries it naturally.
    #[error("network error: {0}")]
    Network(String),

    /// Token provider failed; the fill pass cannot proceed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// A layer has no persisted id and cannot be fetched.
    #[error("layer {layer_name:?} has no id; skipping fetch")]
    MissingLayerId {
        /// Name of the misconfigured layer
        layer_name: String,
    },

    /// Malformed color encoding in layer styling. This signals a
    /// configuration bug, not a transient condition, so it fails fast.
    #[error("invalid color input: {0:?}")]
    InvalidColorInput(String),

    /// Degenerate time interval (start >= end)
    #[error("invalid range: start {start} >= end {end}")]
    InvalidRange {
        /// Requested lower bound
        start: i64,
        /// Requested upper bound
        end: i64,
    },

    /// Layer id not present in the store
    #[error("unknown layer: {0}")]
    UnknownLayer(LayerId),

    /// Request id not present in the pending set
    #[error("unknown request: {0}")]
    UnknownRequest(RequestId),

    /// Wire payload could not be parsed at all
    #[error("payload parse error: {0}")]
    PayloadParse(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::PayloadParse(e.to_string())
    }
}
