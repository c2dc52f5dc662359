//! Grid alignment: reconciling heterogeneous raster extents onto a common
//! pixel grid.
//!
//! Alignment runs once per engine run. It intersects every input dataset's
//! ground extent (optionally restricted by a caller envelope), converts the
//! intersection to pixel counts using the shared pixel size, and records an
//! integer pixel offset per dataset locating the grid's top-left corner
//! inside that dataset.

use raster_common::{Envelope, GeoTransform};

use crate::dataset::RasterDataset;
use crate::error::{EngineError, Result};

/// Integer pixel displacement of the aligned grid's top-left corner within
/// one dataset's own raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelOffset {
    pub dx: usize,
    pub dy: usize,
}

/// The common pixel grid shared by all input datasets.
///
/// Created once per run and immutable thereafter. `offsets[i]` belongs to
/// the i-th dataset passed to [`align_datasets`].
#[derive(Debug, Clone)]
pub struct AlignedGrid {
    /// Grid width in pixels (>= 1).
    pub width: usize,
    /// Grid height in pixels (>= 1).
    pub height: usize,
    /// Normalized geotransform of the grid (top-left origin, positive
    /// pixel height).
    pub geo_transform: GeoTransform,
    /// Per-dataset pixel offsets, in input order.
    pub offsets: Vec<PixelOffset>,
}

impl AlignedGrid {
    /// Ground-space envelope of one grid pixel.
    pub fn pixel_envelope(&self, col: usize, row: usize) -> Envelope {
        self.geo_transform.pixel_envelope(col, row)
    }

    /// Total number of pixels in the grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Check if the grid is empty (never true for a successful alignment).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Align a list of raster datasets onto a common pixel grid.
///
/// All datasets must share pixel resolution within `resolution_tolerance`
/// (relative); mismatches are rejected rather than producing silently wrong
/// offsets. If `envelope` is narrower than one pixel in either axis, a
/// local copy is buffered symmetrically by half a pixel in X and Y so the
/// resulting grid is at least 1x1; the caller's envelope is never mutated.
pub fn align_datasets(
    datasets: &[&dyn RasterDataset],
    envelope: Option<&Envelope>,
    resolution_tolerance: f64,
) -> Result<AlignedGrid> {
    if datasets.is_empty() {
        return Err(EngineError::EmptyGroup(
            "alignment needs at least one dataset".to_string(),
        ));
    }

    // Normalize every geotransform and validate resolutions up front.
    let mut transforms = Vec::with_capacity(datasets.len());
    for (i, ds) in datasets.iter().enumerate() {
        let gt = ds.geo_transform();
        gt.validate()
            .map_err(|e| EngineError::InvalidGeoTransform {
                dataset: i,
                message: e.to_string(),
            })?;
        let (_, height_px) = ds.size();
        let norm = gt.normalized(height_px);
        if norm.pixel_width <= 0.0 {
            return Err(EngineError::InvalidGeoTransform {
                dataset: i,
                message: format!("non-positive pixel width {}", norm.pixel_width),
            });
        }
        transforms.push(norm);
    }

    let pixel_w = transforms[0].pixel_width;
    let pixel_h = transforms[0].pixel_height;
    for (i, t) in transforms.iter().enumerate().skip(1) {
        let dx = (t.pixel_width - pixel_w).abs();
        let dy = (t.pixel_height - pixel_h).abs();
        if dx > resolution_tolerance * pixel_w || dy > resolution_tolerance * pixel_h {
            return Err(EngineError::ResolutionMismatch {
                dataset: i,
                got_x: t.pixel_width,
                got_y: t.pixel_height,
                want_x: pixel_w,
                want_y: pixel_h,
            });
        }
    }

    // Intersect all dataset extents.
    let mut common = {
        let (w, h) = datasets[0].size();
        transforms[0].extent(w, h)
    };
    for (i, (ds, t)) in datasets.iter().zip(&transforms).enumerate().skip(1) {
        let (w, h) = ds.size();
        let extent = t.extent(w, h);
        common = common
            .intersection(&extent)
            .ok_or_else(|| EngineError::no_overlap(format!("dataset {i} outside common extent")))?;
    }

    // Restrict to the caller envelope, buffering degenerate ones so the
    // grid is at least one pixel in each dimension.
    if let Some(env) = envelope {
        let target = if env.width() < pixel_w || env.height() < pixel_h {
            env.expand(pixel_w / 2.0, pixel_h / 2.0)
        } else {
            *env
        };
        common = common
            .intersection(&target)
            .ok_or_else(|| EngineError::no_overlap("envelope outside raster extents"))?;
    }

    let mut width = (common.width() / pixel_w).round().max(1.0) as usize;
    let mut height = (common.height() / pixel_h).round().max(1.0) as usize;

    let grid_transform = GeoTransform::new(common.min_x, common.max_y, pixel_w, pixel_h);

    // Per-dataset offsets, clamped so streaming reads stay inside each
    // raster even when the grid origin sits off the dataset's pixel lattice.
    let mut offsets = Vec::with_capacity(datasets.len());
    for (ds, t) in datasets.iter().zip(&transforms) {
        let (col, row) = t.ground_to_pixel(common.min_x, common.max_y);
        let dx = col.max(0) as usize;
        let dy = row.max(0) as usize;

        let (ds_w, ds_h) = ds.size();
        width = width.min(ds_w.saturating_sub(dx));
        height = height.min(ds_h.saturating_sub(dy));
        offsets.push(PixelOffset { dx, dy });
    }

    if width == 0 || height == 0 {
        return Err(EngineError::no_overlap("overlap smaller than one pixel"));
    }

    tracing::debug!(width, height, datasets = datasets.len(), "aligned grid");

    Ok(AlignedGrid {
        width,
        height,
        geo_transform: grid_transform,
        offsets,
    })
}

/// One logical band's location: its owning dataset, the band index within
/// that dataset, and the dataset's grid offset.
#[derive(Debug, Clone, Copy)]
pub struct BandRef {
    pub dataset: usize,
    pub band: usize,
    pub offset: PixelOffset,
}

/// Maps each flattened logical band of a dataset group to the offset of
/// its owning dataset. Built once per run, read-only during streaming.
#[derive(Debug, Clone)]
pub struct BandOffsetTable {
    entries: Vec<BandRef>,
}

impl BandOffsetTable {
    /// Build the table for a group of datasets.
    ///
    /// `dataset_indices` selects the group's datasets (indices into the
    /// list that was aligned), so two groups aligned together each get
    /// their own table over the shared [`AlignedGrid`].
    pub fn build(
        datasets: &[&dyn RasterDataset],
        grid: &AlignedGrid,
        dataset_indices: &[usize],
    ) -> Self {
        let mut entries = Vec::new();
        for &idx in dataset_indices {
            let offset = grid.offsets[idx];
            for band in 0..datasets[idx].band_count() {
                entries.push(BandRef {
                    dataset: idx,
                    band,
                    offset,
                });
            }
        }
        Self { entries }
    }

    /// Number of logical bands in the group.
    pub fn num_bands(&self) -> usize {
        self.entries.len()
    }

    /// All band references in flattened order.
    pub fn entries(&self) -> &[BandRef] {
        &self.entries
    }
}
