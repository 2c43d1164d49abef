//! Error types
//!
//! Geometry errors are always recovered locally (the offending polygon is
//! skipped). Fetch errors surface as a status message and leave the current
//! water set in place.

use thiserror::Error;

/// A water geometry that cannot take part in containment tests
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon has an empty outer ring")]
    NoRings,
    #[error("ring {ring} has {len} positions, need at least 4")]
    RingTooShort { ring: usize, len: usize },
    #[error("ring {ring} has a non-finite coordinate")]
    NonFinite { ring: usize },
}

/// Failure to refresh the water polygon set
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Overpass error: {0}")]
    Status(u16),
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("could not parse response: {0}")]
    Parse(#[from] serde_json::Error),
}
