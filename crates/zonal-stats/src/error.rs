//! Error types for zonal statistics.

use thiserror::Error;

use aggregation_engine::EngineError;

/// Result type for zonal-statistics operations.
pub type Result<T> = std::result::Result<T, ZonalError>;

/// Errors raised while preparing or driving zonal runs.
#[derive(Debug, Error)]
pub enum ZonalError {
    /// The underlying engine run failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A feature's geometry could not be used (e.g. no bounding envelope).
    #[error("unusable feature geometry for feature {feature_id}: {message}")]
    UnusableFeature { feature_id: i64, message: String },
}
