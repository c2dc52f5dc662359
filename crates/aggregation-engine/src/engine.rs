//! The streaming aggregation engine.
//!
//! All four traversal modes share one internal shape:
//! validate -> align -> allocate scanline buffers -> stream rows
//! top-to-bottom -> dispatch per column left-to-right -> drain strategy
//! outputs into the caller's buffer. Rows and columns are visited in a
//! deterministic order in every mode, so strategies that depend on
//! accumulation order (first-pixel-sets-initial-value patterns) are
//! reproducible.
//!
//! Per-run scratch state (the aligned grid, band offset tables, scanline
//! buffers) lives in stack-owned values dropped on every exit path; the
//! only state that outlives a run is the strategy's own accumulator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use geo::{Point, Polygon};

use raster_common::Envelope;

use crate::align::{align_datasets, AlignedGrid, BandOffsetTable};
use crate::classify::{classify_pixel, validate_polygon, PixelPolyMode};
use crate::config::EngineConfig;
use crate::dataset::RasterDataset;
use crate::error::{EngineError, Result};
use crate::strategy::{AggregationStrategy, Capability};

/// Per-group streaming scratch: the band offset table, one scanline buffer
/// per logical band, and the per-pixel column rebuilt every dispatch.
struct GroupBuffers {
    table: BandOffsetTable,
    scanlines: Vec<Vec<f32>>,
    column: Vec<f32>,
}

impl GroupBuffers {
    fn allocate(datasets: &[&dyn RasterDataset], grid: &AlignedGrid, indices: &[usize]) -> Self {
        let table = BandOffsetTable::build(datasets, grid, indices);
        let scanlines = vec![vec![0.0; grid.width]; table.num_bands()];
        let column = Vec::with_capacity(table.num_bands());
        Self {
            table,
            scanlines,
            column,
        }
    }

    fn num_bands(&self) -> usize {
        self.table.num_bands()
    }

    /// Read one grid row of every logical band into the scanline buffers.
    fn read_row(&mut self, datasets: &[&dyn RasterDataset], row: usize, width: usize) -> Result<()> {
        for (buf, band) in self.scanlines.iter_mut().zip(self.table.entries()) {
            datasets[band.dataset].read_scanline(
                band.band,
                band.offset.dx,
                band.offset.dy + row,
                width,
                buf,
            )?;
        }
        Ok(())
    }

    /// Rebuild the pixel column for `col` from the current scanlines.
    fn fill_column(&mut self, col: usize) -> &[f32] {
        self.fill_column_from(col, 0)
    }

    /// Rebuild the pixel column for `col`, skipping the first `first_band`
    /// logical bands (used by the rasterized-ID mode to hide the ID band).
    fn fill_column_from(&mut self, col: usize, first_band: usize) -> &[f32] {
        self.column.clear();
        for buf in &self.scanlines[first_band..] {
            self.column.push(buf[col]);
        }
        &self.column
    }
}

/// Geometry-aware streaming raster aggregation engine.
///
/// Single-threaded and synchronous: one `run_*` call blocks until the
/// whole aligned grid has been streamed. The strategy instance is the only
/// shared mutable state and must not be used by another run while one is
/// in flight.
pub struct AggregationEngine {
    config: EngineConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl AggregationEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
            cancel: None,
        }
    }

    /// Attach a cooperative cancellation flag, checked at row boundaries.
    ///
    /// Cancellation never affects per-pixel ordering; a cancelled run
    /// fails with [`EngineError::Cancelled`] and leaves the caller's
    /// output buffer untouched.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whole-grid traversal over one or two dataset groups.
    ///
    /// With two groups, every pixel dispatches
    /// [`AggregationStrategy::visit_paired_bands`] with both columns; with
    /// one group, [`AggregationStrategy::visit_band`]. `band_a`/`band_b`
    /// are bounds-checked against the flattened band ranges before
    /// streaming starts.
    pub fn run_whole_grid(
        &self,
        group_a: &[&dyn RasterDataset],
        group_b: Option<&[&dyn RasterDataset]>,
        strategy: &mut dyn AggregationStrategy,
        band_a: usize,
        band_b: usize,
        output: &mut [f64],
    ) -> Result<()> {
        require_group(group_a, "group A")?;
        if let Some(b) = group_b {
            require_group(b, "group B")?;
        }
        let capability = if group_b.is_some() {
            Capability::PairedBands
        } else {
            Capability::Band
        };
        require_capability(strategy, capability)?;
        check_output_len(strategy, output)?;

        let all: Vec<&dyn RasterDataset> = group_a
            .iter()
            .copied()
            .chain(group_b.into_iter().flat_map(|g| g.iter().copied()))
            .collect();
        let grid = align_datasets(&all, None, self.config.resolution_tolerance)?;

        let indices_a: Vec<usize> = (0..group_a.len()).collect();
        let mut buffers_a = GroupBuffers::allocate(&all, &grid, &indices_a);
        check_band(band_a, buffers_a.num_bands())?;

        let mut buffers_b = match group_b {
            Some(g) => {
                let indices: Vec<usize> =
                    (group_a.len()..group_a.len() + g.len()).collect();
                let buffers = GroupBuffers::allocate(&all, &grid, &indices);
                check_band(band_b, buffers.num_bands())?;
                Some(buffers)
            }
            None => None,
        };

        for row in 0..grid.height {
            self.row_boundary(row, grid.height)?;
            buffers_a.read_row(&all, row, grid.width)?;
            if let Some(b) = buffers_b.as_mut() {
                b.read_row(&all, row, grid.width)?;
            }

            for col in 0..grid.width {
                match buffers_b.as_mut() {
                    Some(b) => {
                        let col_a = buffers_a.fill_column(col);
                        let col_b = b.fill_column(col);
                        strategy.visit_paired_bands(col_a, col_b, band_a, band_b)?;
                    }
                    None => {
                        let col_a = buffers_a.fill_column(col);
                        strategy.visit_band(col_a, band_a)?;
                    }
                }
            }
        }

        strategy.outputs(output)
    }

    /// Windowed traversal: every pixel dispatches
    /// [`AggregationStrategy::visit_extent`] with the pixel's
    /// georeferenced footprint, walked row-major from the aligned
    /// geotransform.
    pub fn run_windowed(
        &self,
        group: &[&dyn RasterDataset],
        strategy: &mut dyn AggregationStrategy,
        output: &mut [f64],
    ) -> Result<()> {
        require_group(group, "group")?;
        require_capability(strategy, Capability::Extent)?;
        check_output_len(strategy, output)?;

        let grid = align_datasets(group, None, self.config.resolution_tolerance)?;
        let indices: Vec<usize> = (0..group.len()).collect();
        let mut buffers = GroupBuffers::allocate(group, &grid, &indices);

        for row in 0..grid.height {
            self.row_boundary(row, grid.height)?;
            buffers.read_row(group, row, grid.width)?;

            for col in 0..grid.width {
                let extent = grid.pixel_envelope(col, row);
                let values = buffers.fill_column(col);
                strategy.visit_extent(values, extent)?;
            }
        }

        strategy.outputs(output)
    }

    /// Polygon-filtered traversal: aligns to the (possibly pixel-buffered)
    /// envelope, classifies every pixel under `mode`, and dispatches
    /// [`AggregationStrategy::visit_polygon_pixel`] exactly once per
    /// included pixel with the intersection fraction, the polygon, and the
    /// pixel-center point.
    ///
    /// With `emit_output = false` the drain step is skipped so a caller
    /// can keep accumulating the same strategy across several runs.
    #[allow(clippy::too_many_arguments)]
    pub fn run_polygon_filtered(
        &self,
        group: &[&dyn RasterDataset],
        strategy: &mut dyn AggregationStrategy,
        envelope: &Envelope,
        polygon: &Polygon<f64>,
        mode: PixelPolyMode,
        emit_output: bool,
        output: &mut [f64],
    ) -> Result<()> {
        require_group(group, "group")?;
        require_capability(strategy, Capability::PolygonPixel)?;
        validate_polygon(polygon)?;
        if emit_output {
            check_output_len(strategy, output)?;
        }

        let grid = align_datasets(group, Some(envelope), self.config.resolution_tolerance)?;
        let indices: Vec<usize> = (0..group.len()).collect();
        let mut buffers = GroupBuffers::allocate(group, &grid, &indices);

        for row in 0..grid.height {
            self.row_boundary(row, grid.height)?;
            buffers.read_row(group, row, grid.width)?;

            for col in 0..grid.width {
                let pixel = grid.pixel_envelope(col, row);
                let result = classify_pixel(&pixel, polygon, mode);
                if !result.included {
                    continue;
                }
                let (cx, cy) = pixel.center();
                let values = buffers.fill_column(col);
                strategy.visit_polygon_pixel(
                    values,
                    result.fraction,
                    polygon,
                    Point::new(cx, cy),
                )?;
            }
        }

        if emit_output {
            strategy.outputs(output)?;
        }
        Ok(())
    }

    /// Rasterized-ID-filtered traversal.
    ///
    /// The first logical band of the first dataset is a pre-rasterized
    /// feature/clump-ID channel. Every pixel whose ID value equals
    /// `feature_id` (floating-point equality; callers must have produced
    /// the ID raster with integer-safe encoding) dispatches
    /// [`AggregationStrategy::visit_band`] with the remaining bands. This
    /// trades exact geometry testing for O(1) pixel membership when the
    /// zone has already been rasterized upstream.
    pub fn run_rasterized_id_filtered(
        &self,
        group: &[&dyn RasterDataset],
        strategy: &mut dyn AggregationStrategy,
        envelope: Option<&Envelope>,
        feature_id: i64,
        emit_output: bool,
        output: &mut [f64],
    ) -> Result<()> {
        require_group(group, "group")?;
        require_capability(strategy, Capability::Band)?;
        if emit_output {
            check_output_len(strategy, output)?;
        }

        let grid = align_datasets(group, envelope, self.config.resolution_tolerance)?;
        let indices: Vec<usize> = (0..group.len()).collect();
        let mut buffers = GroupBuffers::allocate(group, &grid, &indices);
        if buffers.num_bands() < 2 {
            return Err(EngineError::EmptyGroup(
                "rasterized-ID traversal needs at least one data band after the ID band"
                    .to_string(),
            ));
        }

        let id = feature_id as f64;
        for row in 0..grid.height {
            self.row_boundary(row, grid.height)?;
            buffers.read_row(group, row, grid.width)?;

            for col in 0..grid.width {
                if f64::from(buffers.scanlines[0][col]) != id {
                    continue;
                }
                let values = buffers.fill_column_from(col, 1);
                strategy.visit_band(values, 0)?;
            }
        }

        if emit_output {
            strategy.outputs(output)?;
        }
        Ok(())
    }

    /// Row-boundary bookkeeping: cooperative cancellation and decile
    /// progress. Progress is a side effect only and carries no
    /// correctness contract.
    fn row_boundary(&self, row: usize, height: usize) -> Result<()> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(EngineError::Cancelled);
            }
        }
        if self.config.report_progress {
            let decile = (height / 10).max(1);
            if row % decile == 0 {
                tracing::debug!(row, total_rows = height, "streaming rows");
            }
        }
        Ok(())
    }
}

fn require_group(group: &[&dyn RasterDataset], label: &str) -> Result<()> {
    if group.is_empty() {
        return Err(EngineError::EmptyGroup(label.to_string()));
    }
    Ok(())
}

fn require_capability(strategy: &dyn AggregationStrategy, capability: Capability) -> Result<()> {
    if !strategy.supports(capability) {
        return Err(EngineError::UnsupportedCapability {
            strategy: strategy.name(),
            capability,
        });
    }
    Ok(())
}

fn check_output_len(strategy: &dyn AggregationStrategy, output: &[f64]) -> Result<()> {
    let want = strategy.num_output_values();
    if output.len() != want {
        return Err(EngineError::OutputSizeMismatch {
            got: output.len(),
            want,
        });
    }
    Ok(())
}

fn check_band(band: usize, available: usize) -> Result<()> {
    if band >= available {
        return Err(EngineError::BandOutOfRange { band, available });
    }
    Ok(())
}
