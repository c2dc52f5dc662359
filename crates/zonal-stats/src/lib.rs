//! Zonal statistics over raster data, built on the aggregation engine.
//!
//! This crate is the canonical example of the workspace's central pattern:
//! an analysis is one [`aggregation_engine::AggregationStrategy`] plus a
//! driver that streams it through the engine once per zone. Zones are
//! either vector polygons (exact geometry tests per pixel) or entries in a
//! pre-rasterized feature-ID band (O(1) membership per pixel).

pub mod driver;
pub mod error;
pub mod strategies;

pub use driver::{
    zonal_statistics, zonal_statistics_rasterized, ZonalFailure, ZonalFeature, ZonalReport,
    ZonalResult,
};
pub use error::ZonalError;
pub use strategies::{BandStatsStrategy, PixelCountStrategy, SumStrategy};
