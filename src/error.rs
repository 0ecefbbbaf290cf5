//! Error kinds surfaced by the engine.
//!
//! Only [`SurfaceInitError`] is fatal. Image and export failures are
//! recovered where they happen: the offending sprite is skipped, a warning
//! is logged and the walk carries on.

use thiserror::Error;

/// The raster surface could not be allocated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to create a {width}x{height} raster surface")]
pub struct SurfaceInitError {
    pub width: u32,
    pub height: u32,
}

/// Failure to obtain the raw bytes behind a source identifier.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data URI: {0}")]
    DataUrl(String),
    #[error("unsupported source `{0}`")]
    Unsupported(String),
}

/// A sprite's image could not be fetched or decoded.
///
/// Cloneable because every coalesced waiter on the same load receives it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load image `{source_id}`: {reason}")]
pub struct ImageLoadError {
    pub source_id: String,
    pub reason: String,
}

impl ImageLoadError {
    pub fn new(source_id: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }
}

/// A sprite could not be embedded into an exported document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to embed `{source_id}` into the document: {reason}")]
pub struct ExportAssemblyError {
    pub source_id: String,
    pub reason: String,
}

impl ExportAssemblyError {
    pub fn new(source_id: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            source_id: source_id.into(),
            reason: reason.to_string(),
        }
    }
}
