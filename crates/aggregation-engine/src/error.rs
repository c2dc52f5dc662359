//! Error types for the aggregation engine.
//!
//! Every error here is unrecoverable for the current run: a run either
//! completes and populates the caller's output buffer, or fails and leaves
//! the buffer untouched. There is no partial-success mode.

use thiserror::Error;

use crate::strategy::Capability;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while aligning or streaming raster data.
#[derive(Debug, Error)]
pub enum EngineError {
    // === Alignment errors ===
    /// The input extents (and optional caller envelope) do not overlap.
    #[error("no overlap between input rasters{0}")]
    NoOverlap(String),

    /// Input datasets do not share a pixel resolution.
    #[error(
        "pixel resolution mismatch: dataset {dataset} has ({got_x}, {got_y}), expected ({want_x}, {want_y})"
    )]
    ResolutionMismatch {
        dataset: usize,
        got_x: f64,
        got_y: f64,
        want_x: f64,
        want_y: f64,
    },

    /// A dataset carries an unusable geotransform.
    #[error("invalid geotransform for dataset {dataset}: {message}")]
    InvalidGeoTransform { dataset: usize, message: String },

    /// No datasets were supplied for a group that requires at least one.
    #[error("empty dataset group: {0}")]
    EmptyGroup(String),

    // === Dispatch errors ===
    /// A requested logical band index is outside the aligned band range.
    /// Checked once at buffer allocation, before streaming starts.
    #[error("band index {band} out of range (group has {available} bands)")]
    BandOutOfRange { band: usize, available: usize },

    /// A strategy was driven through a traversal mode it does not declare.
    /// This is a programmer error and aborts the run immediately.
    #[error("strategy '{strategy}' does not support the {capability:?} capability")]
    UnsupportedCapability {
        strategy: &'static str,
        capability: Capability,
    },

    // === Geometry errors ===
    /// A degenerate polygon was passed to the classifier.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    // === Buffer errors ===
    /// The caller's output buffer does not match the strategy's size.
    #[error("output buffer has {got} slots but strategy produces {want}")]
    OutputSizeMismatch { got: usize, want: usize },

    // === I/O errors ===
    /// A scanline read failed.
    #[error("failed to read scanline (dataset {dataset}, band {band}, row {row}): {message}")]
    ReadFailed {
        dataset: usize,
        band: usize,
        row: usize,
        message: String,
    },

    /// The run was cancelled cooperatively at a row boundary.
    #[error("run cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl EngineError {
    /// Create a NoOverlap error with a detail suffix.
    pub fn no_overlap(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if detail.is_empty() {
            Self::NoOverlap(String::new())
        } else {
            Self::NoOverlap(format!(": {detail}"))
        }
    }

    /// Create an InvalidGeometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }
}
