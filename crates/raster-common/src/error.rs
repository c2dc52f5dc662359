//! Error types for the shared geospatial primitives.

use thiserror::Error;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Errors raised by the shared primitive types.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("invalid envelope string: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidEnvelopeFormat(String),

    #[error("invalid number in envelope: {0}")]
    InvalidEnvelopeNumber(String),

    #[error("invalid geotransform: {0}")]
    InvalidGeoTransform(String),
}
