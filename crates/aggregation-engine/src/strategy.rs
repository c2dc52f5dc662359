//! The aggregation strategy trait: the pluggable unit of computation the
//! engine drives.
//!
//! Every higher-level analysis (zonal statistics, parameter estimation,
//! classification, ...) is written as one strategy and streamed through
//! the engine. A strategy declares the traversal capabilities it supports;
//! the engine checks membership before dispatch, so driving a strategy
//! through an undeclared mode fails the run immediately instead of being
//! detected by a thrown "not implemented" somewhere inside the row loop.

use geo::{Point, Polygon};

use raster_common::Envelope;

use crate::error::{EngineError, Result};

/// A traversal capability a strategy can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Two-group elementwise traversal ([`AggregationStrategy::visit_paired_bands`]).
    PairedBands,
    /// Whole-grid single-group traversal ([`AggregationStrategy::visit_band`]).
    Band,
    /// Windowed traversal with ground-space footprints ([`AggregationStrategy::visit_extent`]).
    Extent,
    /// Polygon-filtered traversal ([`AggregationStrategy::visit_polygon_pixel`]).
    PolygonPixel,
}

fn unsupported(strategy: &'static str, capability: Capability) -> EngineError {
    EngineError::UnsupportedCapability {
        strategy,
        capability,
    }
}

/// The visitor interface consumed by the aggregation engine.
///
/// A strategy's accumulator state persists across pixels within one run
/// and across runs until [`AggregationStrategy::reset`] is called; callers
/// reuse one instance per logical unit of work (for example, one polygon
/// feature) to amortize allocation.
pub trait AggregationStrategy {
    /// Short name used in diagnostics and error messages.
    fn name(&self) -> &'static str;

    /// The traversal capabilities this strategy implements.
    fn capabilities(&self) -> &'static [Capability];

    /// Whether the strategy declares a given capability.
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Number of values [`AggregationStrategy::outputs`] produces.
    /// Fixed at construction.
    fn num_output_values(&self) -> usize;

    /// Visit one pixel of a two-group traversal. `col_a`/`col_b` hold one
    /// value per logical band of each group; `band_a`/`band_b` are the
    /// band indices the caller asked the run to focus on.
    fn visit_paired_bands(
        &mut self,
        col_a: &[f32],
        col_b: &[f32],
        band_a: usize,
        band_b: usize,
    ) -> Result<()> {
        let _ = (col_a, col_b, band_a, band_b);
        Err(unsupported(self.name(), Capability::PairedBands))
    }

    /// Visit one pixel of a whole-grid single-group traversal.
    fn visit_band(&mut self, col: &[f32], band: usize) -> Result<()> {
        let _ = (col, band);
        Err(unsupported(self.name(), Capability::Band))
    }

    /// Visit one pixel of a windowed traversal together with its
    /// ground-space footprint.
    fn visit_extent(&mut self, col: &[f32], extent: Envelope) -> Result<()> {
        let _ = (col, extent);
        Err(unsupported(self.name(), Capability::Extent))
    }

    /// Visit one polygon-intersecting pixel. Called exactly once per
    /// included pixel (never once per band). The polygon and the resolved
    /// pixel center are supplied so a strategy may run its own secondary
    /// geometry test.
    fn visit_polygon_pixel(
        &mut self,
        col: &[f32],
        fraction: f64,
        polygon: &Polygon<f64>,
        center: Point<f64>,
    ) -> Result<()> {
        let _ = (col, fraction, polygon, center);
        Err(unsupported(self.name(), Capability::PolygonPixel))
    }

    /// Copy the current accumulated results into `out`.
    ///
    /// Must not mutate accumulator state and must be callable at any time.
    /// `out.len()` equals [`AggregationStrategy::num_output_values`] when
    /// called by the engine.
    fn outputs(&self, out: &mut [f64]) -> Result<()>;

    /// Clear all accumulator state back to initial values. Idempotent.
    fn reset(&mut self);
}
