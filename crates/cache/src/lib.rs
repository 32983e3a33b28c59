//! Covered-range cache for incremental annotation fetching
//!
//! This crate tracks which time sub-ranges have already been fetched per
//! layer and which fetches are still in flight:
//! - CoverageMap: sorted, non-overlapping interval set with coalescing
//!   inserts and gap computation
//! - RangeCache: per-layer coverage plus the pending-request set that
//!   suppresses duplicate concurrent fetches

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod coverage;

pub use cache::{PendingFetch, RangeCache};
pub use coverage::{CoverageMap, GapList};
