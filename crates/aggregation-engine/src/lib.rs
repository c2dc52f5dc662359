//! Geometry-Aware Streaming Raster Aggregation Engine
//!
//! This crate aligns multiple raster datasets onto a common pixel grid and
//! streams pixel data, optionally filtered or weighted by vector geometry,
//! into pluggable aggregation strategies. Every higher-level analysis in
//! the workspace (zonal statistics, classifier matrix population, spatial
//! estimation, ...) is built by writing a new strategy and driving it
//! through this engine.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   │
//!   ▼
//! AggregationEngine::run_*(datasets, strategy, geometry?, output)
//!   │
//!   ├─► align_datasets        (common grid + per-dataset offsets, once)
//!   │
//!   ├─► row loop: read one scanline per logical band
//!   │       │
//!   │       └─► column loop: rebuild pixel column
//!   │               │
//!   │               ├─► classify_pixel (polygon-filtered mode only)
//!   │               │
//!   │               └─► strategy.visit_*   (exactly one per pixel)
//!   │
//!   └─► drain strategy outputs into the caller's buffer
//! ```
//!
//! # Traversal modes
//!
//! - **Whole-grid** ([`AggregationEngine::run_whole_grid`]): every pixel,
//!   one or two dataset groups.
//! - **Windowed** ([`AggregationEngine::run_windowed`]): every pixel plus
//!   its ground-space footprint.
//! - **Polygon-filtered** ([`AggregationEngine::run_polygon_filtered`]):
//!   pixels intersecting a polygon under a selectable pixel-in-polygon
//!   policy.
//! - **Rasterized-ID-filtered**
//!   ([`AggregationEngine::run_rasterized_id_filtered`]): pixels whose
//!   value in a pre-rasterized feature-ID band matches a given ID.
//!
//! # Example
//!
//! ```ignore
//! use aggregation_engine::{AggregationEngine, EngineConfig, PixelPolyMode};
//!
//! let engine = AggregationEngine::new(EngineConfig::from_env())?;
//! let mut output = vec![0.0; strategy.num_output_values()];
//! engine.run_polygon_filtered(
//!     &[&dataset],
//!     &mut strategy,
//!     &feature_envelope,
//!     &feature_polygon,
//!     PixelPolyMode::AreaWeighted,
//!     true,
//!     &mut output,
//! )?;
//! ```

pub mod align;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod strategy;

// Re-export commonly used types at crate root
pub use align::{align_datasets, AlignedGrid, BandOffsetTable, BandRef, PixelOffset};
pub use classify::{classify_pixel, validate_polygon, ClassifyResult, CornerRule, PixelPolyMode};
pub use config::EngineConfig;
pub use dataset::{MemoryRasterDataset, RasterDataset};
pub use engine::AggregationEngine;
pub use error::{EngineError, Result};
pub use strategy::{AggregationStrategy, Capability};

// The geometry types strategies see in their visit signatures.
pub use geo::{Point, Polygon};
pub use raster_common::{Envelope, GeoTransform};
