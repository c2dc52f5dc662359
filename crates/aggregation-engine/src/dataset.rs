//! Raster dataset abstraction consumed by the engine.
//!
//! The engine never opens files and never writes rasters; it borrows open
//! datasets through [`RasterDataset`] for the duration of one run. Format
//! handling (GeoTIFF, Zarr, GRIB2, ...) lives behind this trait in the
//! crates that own the I/O.

use raster_common::GeoTransform;

use crate::error::{EngineError, Result};

/// Read access to an open raster dataset.
pub trait RasterDataset {
    /// Number of bands in the dataset.
    fn band_count(&self) -> usize;

    /// Raster dimensions in pixels (width, height).
    fn size(&self) -> (usize, usize);

    /// The dataset's geotransform, as stored (pixel height may be signed).
    fn geo_transform(&self) -> GeoTransform;

    /// Read `width` pixels of one band starting at pixel (x, y) into `buf`.
    ///
    /// `buf.len()` must equal `width`. The requested window is always
    /// inside the raster when called by the engine (alignment guarantees
    /// it), but implementations should still bounds-check.
    fn read_scanline(&self, band: usize, x: usize, y: usize, width: usize, buf: &mut [f32])
        -> Result<()>;
}

/// An in-memory raster dataset with band-major, row-major storage.
///
/// Used by tests and by callers that already hold decoded grids (for
/// example a clump-ID raster produced by an upstream rasterization step).
#[derive(Debug, Clone)]
pub struct MemoryRasterDataset {
    bands: Vec<Vec<f32>>,
    width: usize,
    height: usize,
    geo_transform: GeoTransform,
}

impl MemoryRasterDataset {
    /// Create a dataset from per-band row-major grids.
    ///
    /// Every band must contain exactly `width * height` values.
    pub fn new(
        bands: Vec<Vec<f32>>,
        width: usize,
        height: usize,
        geo_transform: GeoTransform,
    ) -> Result<Self> {
        if bands.is_empty() {
            return Err(EngineError::EmptyGroup(
                "dataset must have at least one band".to_string(),
            ));
        }
        for (i, band) in bands.iter().enumerate() {
            if band.len() != width * height {
                return Err(EngineError::ReadFailed {
                    dataset: 0,
                    band: i,
                    row: 0,
                    message: format!(
                        "band has {} values, expected {}",
                        band.len(),
                        width * height
                    ),
                });
            }
        }

        Ok(Self {
            bands,
            width,
            height,
            geo_transform,
        })
    }

    /// Convenience constructor for a single-band dataset.
    pub fn single_band(
        data: Vec<f32>,
        width: usize,
        height: usize,
        geo_transform: GeoTransform,
    ) -> Result<Self> {
        Self::new(vec![data], width, height, geo_transform)
    }
}

impl RasterDataset for MemoryRasterDataset {
    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn geo_transform(&self) -> GeoTransform {
        self.geo_transform
    }

    fn read_scanline(
        &self,
        band: usize,
        x: usize,
        y: usize,
        width: usize,
        buf: &mut [f32],
    ) -> Result<()> {
        let fail = |message: String| EngineError::ReadFailed {
            dataset: 0,
            band,
            row: y,
            message,
        };

        let data = self
            .bands
            .get(band)
            .ok_or_else(|| fail(format!("band {} out of {}", band, self.bands.len())))?;
        if buf.len() != width {
            return Err(fail(format!(
                "buffer length {} does not match requested width {}",
                buf.len(),
                width
            )));
        }
        if x + width > self.width || y >= self.height {
            return Err(fail(format!(
                "window x={x} w={width} y={y} outside raster {}x{}",
                self.width, self.height
            )));
        }

        let start = y * self.width + x;
        buf.copy_from_slice(&data[start..start + width]);
        Ok(())
    }
}
