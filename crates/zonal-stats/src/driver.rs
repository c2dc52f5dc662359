//! Per-feature drivers: stream one strategy through the engine once per
//! zone, resetting between zones.

use geo::{BoundingRect, Polygon};
use serde::Serialize;

use raster_common::Envelope;

use aggregation_engine::{AggregationEngine, AggregationStrategy, PixelPolyMode, RasterDataset};

use crate::error::{Result, ZonalError};

/// One vector zone: a feature identifier, its polygon, and the polygon's
/// bounding envelope used to restrict alignment.
#[derive(Debug, Clone)]
pub struct ZonalFeature {
    pub id: i64,
    pub polygon: Polygon<f64>,
    pub envelope: Envelope,
}

impl ZonalFeature {
    /// Create a feature, deriving the envelope from the polygon's bounds.
    pub fn new(id: i64, polygon: Polygon<f64>) -> Result<Self> {
        let rect = polygon
            .bounding_rect()
            .ok_or_else(|| ZonalError::UnusableFeature {
                feature_id: id,
                message: "polygon has no bounding rectangle".to_string(),
            })?;
        let envelope = Envelope::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y);
        Ok(Self {
            id,
            polygon,
            envelope,
        })
    }
}

/// Statistics for one zone.
#[derive(Debug, Clone, Serialize)]
pub struct ZonalResult {
    pub feature_id: i64,
    pub values: Vec<f64>,
}

/// A zone that failed; the run continued with the remaining zones.
#[derive(Debug, Clone, Serialize)]
pub struct ZonalFailure {
    pub feature_id: i64,
    pub message: String,
}

/// Outcome of a multi-zone run: successful zones in input order, plus the
/// zones that were skipped after a per-zone failure.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ZonalReport {
    pub results: Vec<ZonalResult>,
    pub failures: Vec<ZonalFailure>,
}

/// Compute zonal statistics for a list of polygon features.
///
/// The strategy is reset before each feature and drained after it, so one
/// instance serves all features. A failing feature (no raster overlap,
/// degenerate geometry, read error) is skipped with a warning and recorded
/// in the report; the engine itself never retries. Features are processed
/// in input order.
pub fn zonal_statistics(
    engine: &AggregationEngine,
    datasets: &[&dyn RasterDataset],
    features: &[ZonalFeature],
    mode: PixelPolyMode,
    strategy: &mut dyn AggregationStrategy,
) -> ZonalReport {
    let mut report = ZonalReport::default();

    for feature in features {
        strategy.reset();
        let mut values = vec![0.0f64; strategy.num_output_values()];
        match engine.run_polygon_filtered(
            datasets,
            strategy,
            &feature.envelope,
            &feature.polygon,
            mode,
            true,
            &mut values,
        ) {
            Ok(()) => report.results.push(ZonalResult {
                feature_id: feature.id,
                values,
            }),
            Err(e) => {
                tracing::warn!(feature_id = feature.id, error = %e, "skipping zone");
                report.failures.push(ZonalFailure {
                    feature_id: feature.id,
                    message: e.to_string(),
                });
            }
        }
    }

    report
}

/// Compute zonal statistics against a pre-rasterized feature-ID band.
///
/// `datasets` must lead with the ID raster (its first band is the ID
/// channel); statistics are computed over the remaining bands for each
/// requested ID. IDs absent from the raster yield empty-zone outputs, not
/// failures.
pub fn zonal_statistics_rasterized(
    engine: &AggregationEngine,
    datasets: &[&dyn RasterDataset],
    feature_ids: &[i64],
    envelope: Option<&Envelope>,
    strategy: &mut dyn AggregationStrategy,
) -> ZonalReport {
    let mut report = ZonalReport::default();

    for &id in feature_ids {
        strategy.reset();
        let mut values = vec![0.0f64; strategy.num_output_values()];
        match engine.run_rasterized_id_filtered(datasets, strategy, envelope, id, true, &mut values)
        {
            Ok(()) => report.results.push(ZonalResult {
                feature_id: id,
                values,
            }),
            Err(e) => {
                tracing::warn!(feature_id = id, error = %e, "skipping zone");
                report.failures.push(ZonalFailure {
                    feature_id: id,
                    message: e.to_string(),
                });
            }
        }
    }

    report
}
