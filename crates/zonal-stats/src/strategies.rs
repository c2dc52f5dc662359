//! Concrete aggregation strategies for zonal statistics.
//!
//! Each strategy keeps its mutable state in an explicit accumulator struct
//! so reset and reuse are a single replacement with the default value, and
//! a future row-partitioned merge has a concrete object to merge.

use aggregation_engine::{AggregationStrategy, Capability, Point, Polygon, Result};

/// Fraction-weighted per-band sums.
///
/// In polygon-filtered runs each pixel contributes `value * fraction`; in
/// whole-grid and rasterized-ID runs the weight is 1. NaN values are
/// skipped. Outputs one sum per band.
pub struct SumStrategy {
    num_bands: usize,
    acc: SumAccumulator,
}

#[derive(Debug, Clone, Default)]
struct SumAccumulator {
    sums: Vec<f64>,
}

impl SumStrategy {
    pub fn new(num_bands: usize) -> Self {
        Self {
            num_bands,
            acc: SumAccumulator {
                sums: vec![0.0; num_bands],
            },
        }
    }

    fn add(&mut self, col: &[f32], weight: f64) {
        for (sum, &value) in self.acc.sums.iter_mut().zip(col) {
            if value.is_nan() {
                continue;
            }
            *sum += f64::from(value) * weight;
        }
    }
}

impl AggregationStrategy for SumStrategy {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Band, Capability::PolygonPixel]
    }

    fn num_output_values(&self) -> usize {
        self.num_bands
    }

    fn visit_band(&mut self, col: &[f32], _band: usize) -> Result<()> {
        self.add(col, 1.0);
        Ok(())
    }

    fn visit_polygon_pixel(
        &mut self,
        col: &[f32],
        fraction: f64,
        _polygon: &Polygon<f64>,
        _center: Point<f64>,
    ) -> Result<()> {
        self.add(col, fraction);
        Ok(())
    }

    fn outputs(&self, out: &mut [f64]) -> Result<()> {
        out.copy_from_slice(&self.acc.sums);
        Ok(())
    }

    fn reset(&mut self) {
        self.acc.sums.iter_mut().for_each(|s| *s = 0.0);
    }
}

/// Pixel counting: whole pixels and fraction-weighted coverage.
///
/// Outputs `[pixel_count, weighted_count]`; multiplied by the pixel area
/// the weighted count gives the zone's area as seen by the grid.
#[derive(Default)]
pub struct PixelCountStrategy {
    acc: CountAccumulator,
}

#[derive(Debug, Clone, Copy, Default)]
struct CountAccumulator {
    pixels: u64,
    weighted: f64,
}

impl PixelCountStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AggregationStrategy for PixelCountStrategy {
    fn name(&self) -> &'static str {
        "pixel-count"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Band, Capability::PolygonPixel]
    }

    fn num_output_values(&self) -> usize {
        2
    }

    fn visit_band(&mut self, _col: &[f32], _band: usize) -> Result<()> {
        self.acc.pixels += 1;
        self.acc.weighted += 1.0;
        Ok(())
    }

    fn visit_polygon_pixel(
        &mut self,
        _col: &[f32],
        fraction: f64,
        _polygon: &Polygon<f64>,
        _center: Point<f64>,
    ) -> Result<()> {
        self.acc.pixels += 1;
        self.acc.weighted += fraction;
        Ok(())
    }

    fn outputs(&self, out: &mut [f64]) -> Result<()> {
        out[0] = self.acc.pixels as f64;
        out[1] = self.acc.weighted;
        Ok(())
    }

    fn reset(&mut self) {
        self.acc = CountAccumulator::default();
    }
}

/// Per-band count/mean/stddev/min/max.
///
/// Outputs five values per band, in band order:
/// `[count, mean, stddev, min, max]`. NaN values are skipped and do not
/// count. Polygon fractions do not weight these statistics; a pixel either
/// participates or it does not, matching the usual zonal-table convention.
pub struct BandStatsStrategy {
    num_bands: usize,
    acc: Vec<StatsAccumulator>,
}

#[derive(Debug, Clone, Copy)]
struct StatsAccumulator {
    count: u64,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl StatsAccumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn emit(&self, out: &mut [f64]) {
        if self.count == 0 {
            out.copy_from_slice(&[0.0, f64::NAN, f64::NAN, f64::NAN, f64::NAN]);
            return;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        out.copy_from_slice(&[n, mean, variance.sqrt(), self.min, self.max]);
    }
}

impl BandStatsStrategy {
    /// Number of output values per band.
    pub const VALUES_PER_BAND: usize = 5;

    pub fn new(num_bands: usize) -> Self {
        Self {
            num_bands,
            acc: vec![StatsAccumulator::default(); num_bands],
        }
    }

    fn push_column(&mut self, col: &[f32]) {
        for (acc, &value) in self.acc.iter_mut().zip(col) {
            if value.is_nan() {
                continue;
            }
            acc.push(f64::from(value));
        }
    }
}

impl AggregationStrategy for BandStatsStrategy {
    fn name(&self) -> &'static str {
        "band-stats"
    }

    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Band, Capability::PolygonPixel]
    }

    fn num_output_values(&self) -> usize {
        self.num_bands * Self::VALUES_PER_BAND
    }

    fn visit_band(&mut self, col: &[f32], _band: usize) -> Result<()> {
        self.push_column(col);
        Ok(())
    }

    fn visit_polygon_pixel(
        &mut self,
        col: &[f32],
        _fraction: f64,
        _polygon: &Polygon<f64>,
        _center: Point<f64>,
    ) -> Result<()> {
        self.push_column(col);
        Ok(())
    }

    fn outputs(&self, out: &mut [f64]) -> Result<()> {
        for (band, acc) in self.acc.iter().enumerate() {
            let start = band * Self::VALUES_PER_BAND;
            acc.emit(&mut out[start..start + Self::VALUES_PER_BAND]);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.acc.iter_mut().for_each(|a| *a = StatsAccumulator::default());
    }
}
