//! Configuration for the aggregation engine.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Configuration for the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Emit decile progress events while streaming rows.
    pub report_progress: bool,

    /// Relative tolerance when comparing pixel resolutions across input
    /// datasets during alignment.
    pub resolution_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            report_progress: true,
            resolution_tolerance: 1e-6,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("AGG_REPORT_PROGRESS") {
            config.report_progress = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("AGG_RESOLUTION_TOLERANCE") {
            if let Ok(tol) = val.parse() {
                config.resolution_tolerance = tol;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.resolution_tolerance < 0.0 || !self.resolution_tolerance.is_finite() {
            return Err(EngineError::ConfigError(format!(
                "resolution_tolerance must be finite and >= 0, got {}",
                self.resolution_tolerance
            )));
        }
        Ok(())
    }
}
