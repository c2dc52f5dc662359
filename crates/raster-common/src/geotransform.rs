//! Raster geotransform: the mapping between pixel and ground coordinates.

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::error::{CommonError, CommonResult};

/// An affine north-up geotransform for a regular pixel grid.
///
/// `origin_x`/`origin_y` locate the outer corner of pixel (0, 0).
/// `pixel_height` is stored signed, matching common raster conventions
/// where a negative height encodes a top-left origin; [`Self::normalized`]
/// produces the positive-height, top-left-origin form the alignment code
/// works with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Create a new geotransform.
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Validate pixel sizes. A zero pixel dimension makes every
    /// pixel/ground conversion meaningless.
    pub fn validate(&self) -> CommonResult<()> {
        if self.pixel_width == 0.0 || self.pixel_height == 0.0 {
            return Err(CommonError::InvalidGeoTransform(format!(
                "zero pixel size ({}, {})",
                self.pixel_width, self.pixel_height
            )));
        }
        if !self.pixel_width.is_finite()
            || !self.pixel_height.is_finite()
            || !self.origin_x.is_finite()
            || !self.origin_y.is_finite()
        {
            return Err(CommonError::InvalidGeoTransform(
                "non-finite coefficient".to_string(),
            ));
        }
        Ok(())
    }

    /// Return a copy with positive pixel height and the origin at the
    /// top-left corner of the raster.
    pub fn normalized(&self, height_px: usize) -> Self {
        if self.pixel_height < 0.0 {
            // Negative height already means origin_y is the top edge.
            Self {
                origin_x: self.origin_x,
                origin_y: self.origin_y,
                pixel_width: self.pixel_width,
                pixel_height: -self.pixel_height,
            }
        } else {
            // Positive height means origin_y is the bottom edge; shift it up.
            Self {
                origin_x: self.origin_x,
                origin_y: self.origin_y + self.pixel_height * height_px as f64,
                pixel_width: self.pixel_width,
                pixel_height: self.pixel_height,
            }
        }
    }

    /// Ground-space extent of a raster of `width_px` x `height_px` pixels.
    ///
    /// Assumes the normalized (top-left origin, positive height) form.
    pub fn extent(&self, width_px: usize, height_px: usize) -> Envelope {
        Envelope::new(
            self.origin_x,
            self.origin_y - self.pixel_height * height_px as f64,
            self.origin_x + self.pixel_width * width_px as f64,
            self.origin_y,
        )
    }

    /// Ground coordinates of a pixel's top-left corner.
    ///
    /// Assumes the normalized form.
    pub fn pixel_to_ground(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + col as f64 * self.pixel_width,
            self.origin_y - row as f64 * self.pixel_height,
        )
    }

    /// Ground-space envelope of a single pixel.
    ///
    /// Assumes the normalized form.
    pub fn pixel_envelope(&self, col: usize, row: usize) -> Envelope {
        let (left, top) = self.pixel_to_ground(col, row);
        Envelope::new(left, top - self.pixel_height, left + self.pixel_width, top)
    }

    /// Pixel offset of a ground point relative to this transform's origin,
    /// rounded to the nearest whole pixel.
    ///
    /// Assumes the normalized form.
    pub fn ground_to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let col = ((x - self.origin_x) / self.pixel_width).round() as i64;
        let row = ((self.origin_y - y) / self.pixel_height).round() as i64;
        (col, row)
    }
}
