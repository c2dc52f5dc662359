//! Pixel/polygon classification under a selectable policy.
//!
//! Given one pixel's rectangular footprint and a polygon, decide whether
//! (and how much of) the pixel participates in the polygon. The policy is
//! selected once per engine run and held constant; each call is stateless.

use geo::{coord, Area, BooleanOps, Contains, Coord, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

use raster_common::Envelope;

use crate::error::{EngineError, Result};

/// Pixel-in-polygon policy.
///
/// A closed variant set: adding a policy is a compile-time-checked
/// addition, never a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelPolyMode {
    /// The pixel is included iff its center point lies in the polygon.
    /// Fraction is 1.0 or 0.0.
    CenterContainment,
    /// The pixel is included iff it overlaps the polygon at all; fraction
    /// is the overlapped share of the pixel's area.
    AreaWeighted,
    /// A boundary heuristic applied to the pixel's corner ring.
    /// Fraction is 1.0 or 0.0.
    CustomBoundary(CornerRule),
}

/// The boundary-algorithm family for [`PixelPolyMode::CustomBoundary`].
///
/// Each rule operates on the pixel's converted closed corner ring (five
/// vertices, first repeated last) and the per-corner containment pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CornerRule {
    /// Included when any corner lies inside the polygon.
    AnyCornerInside,
    /// Included only when all four corners lie inside the polygon.
    AllCornersInside,
    /// Included when more than half of the corners lie inside.
    MajorityCornersInside,
}

/// Result of classifying one pixel against a polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyResult {
    pub included: bool,
    /// Share of the pixel covered by the polygon. Exactly 1.0 or 0.0 in
    /// every mode except [`PixelPolyMode::AreaWeighted`].
    pub fraction: f64,
}

impl ClassifyResult {
    fn excluded() -> Self {
        Self {
            included: false,
            fraction: 0.0,
        }
    }

    fn fully_included() -> Self {
        Self {
            included: true,
            fraction: 1.0,
        }
    }
}

/// Validate a polygon before a filtered run.
///
/// Degenerate polygons (fewer than four exterior vertices, zero area, or
/// non-finite coordinates) are classifier failures, never silently treated
/// as "not included". The engine calls this once per run, before streaming.
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<()> {
    let exterior = polygon.exterior();
    if exterior.0.len() < 4 {
        return Err(EngineError::invalid_geometry(format!(
            "exterior ring has {} vertices, need at least 4 (closed ring)",
            exterior.0.len()
        )));
    }
    if polygon
        .exterior()
        .0
        .iter()
        .any(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        return Err(EngineError::invalid_geometry(
            "non-finite coordinate in exterior ring",
        ));
    }
    if polygon.unsigned_area() == 0.0 {
        return Err(EngineError::invalid_geometry("polygon has zero area"));
    }
    Ok(())
}

/// Classify one pixel footprint against a polygon under `mode`.
///
/// `pixel` is always axis-aligned; the polygon must already have passed
/// [`validate_polygon`].
pub fn classify_pixel(
    pixel: &Envelope,
    polygon: &Polygon<f64>,
    mode: PixelPolyMode,
) -> ClassifyResult {
    match mode {
        PixelPolyMode::CenterContainment => {
            let (cx, cy) = pixel.center();
            if polygon.contains(&Point::new(cx, cy)) {
                ClassifyResult::fully_included()
            } else {
                ClassifyResult::excluded()
            }
        }
        PixelPolyMode::AreaWeighted => {
            let pixel_poly = pixel_to_rect(pixel).to_polygon();
            let pixel_area = pixel.width() * pixel.height();
            if pixel_area <= 0.0 {
                return ClassifyResult::excluded();
            }
            let overlap = polygon.intersection(&pixel_poly).unsigned_area();
            let fraction = (overlap / pixel_area).clamp(0.0, 1.0);
            ClassifyResult {
                included: fraction > 0.0,
                fraction,
            }
        }
        PixelPolyMode::CustomBoundary(rule) => {
            let ring = corner_ring(pixel);
            // The ring is closed; only the four distinct corners count.
            let inside = ring[..4]
                .iter()
                .filter(|c| polygon.contains(&Point::new(c.x, c.y)))
                .count();
            let included = match rule {
                CornerRule::AnyCornerInside => inside > 0,
                CornerRule::AllCornersInside => inside == 4,
                CornerRule::MajorityCornersInside => inside * 2 > 4,
            };
            if included {
                ClassifyResult::fully_included()
            } else {
                ClassifyResult::excluded()
            }
        }
    }
}

/// Convert a pixel envelope to a geometry rectangle.
fn pixel_to_rect(pixel: &Envelope) -> Rect<f64> {
    Rect::new(
        coord! { x: pixel.min_x, y: pixel.min_y },
        coord! { x: pixel.max_x, y: pixel.max_y },
    )
}

/// The pixel's closed 5-vertex corner ring, clockwise from the top-left.
fn corner_ring(pixel: &Envelope) -> [Coord<f64>; 5] {
    [
        coord! { x: pixel.min_x, y: pixel.max_y },
        coord! { x: pixel.max_x, y: pixel.max_y },
        coord! { x: pixel.max_x, y: pixel.min_y },
        coord! { x: pixel.min_x, y: pixel.min_y },
        coord! { x: pixel.min_x, y: pixel.max_y },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
        polygon![
            (x: min_x, y: min_y),
            (x: max_x, y: min_y),
            (x: max_x, y: max_y),
            (x: min_x, y: max_y),
            (x: min_x, y: min_y),
        ]
    }

    #[test]
    fn test_center_containment() {
        let poly = square(0.0, 0.0, 10.0, 10.0);

        let inside = Envelope::new(4.0, 4.0, 5.0, 5.0);
        let result = classify_pixel(&inside, &poly, PixelPolyMode::CenterContainment);
        assert!(result.included);
        assert_eq!(result.fraction, 1.0);

        let outside = Envelope::new(11.0, 11.0, 12.0, 12.0);
        let result = classify_pixel(&outside, &poly, PixelPolyMode::CenterContainment);
        assert!(!result.included);
        assert_eq!(result.fraction, 0.0);
    }

    #[test]
    fn test_center_containment_straddling_pixel() {
        // Pixel straddles the boundary but its center is outside.
        let poly = square(0.0, 0.0, 10.0, 10.0);
        let pixel = Envelope::new(9.8, 4.0, 10.8, 5.0);
        let result = classify_pixel(&pixel, &poly, PixelPolyMode::CenterContainment);
        assert!(!result.included);
    }

    #[test]
    fn test_area_weighted_half_pixel() {
        let poly = square(0.0, 0.0, 10.0, 10.0);
        // Right half of the pixel hangs outside the polygon.
        let pixel = Envelope::new(9.5, 4.0, 10.5, 5.0);
        let result = classify_pixel(&pixel, &poly, PixelPolyMode::AreaWeighted);
        assert!(result.included);
        assert!((result.fraction - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_area_weighted_fully_covered() {
        let poly = square(0.0, 0.0, 10.0, 10.0);
        let pixel = Envelope::new(2.0, 2.0, 3.0, 3.0);
        let result = classify_pixel(&pixel, &poly, PixelPolyMode::AreaWeighted);
        assert!(result.included);
        assert!((result.fraction - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_weighted_disjoint() {
        let poly = square(0.0, 0.0, 10.0, 10.0);
        let pixel = Envelope::new(20.0, 20.0, 21.0, 21.0);
        let result = classify_pixel(&pixel, &poly, PixelPolyMode::AreaWeighted);
        assert!(!result.included);
        assert_eq!(result.fraction, 0.0);
    }

    #[test]
    fn test_corner_rules() {
        let poly = square(0.0, 0.0, 10.0, 10.0);
        // Two of four corners inside (left edge of the pixel).
        let pixel = Envelope::new(9.5, 4.0, 10.5, 5.0);

        let any = classify_pixel(
            &pixel,
            &poly,
            PixelPolyMode::CustomBoundary(CornerRule::AnyCornerInside),
        );
        assert!(any.included);
        assert_eq!(any.fraction, 1.0);

        let all = classify_pixel(
            &pixel,
            &poly,
            PixelPolyMode::CustomBoundary(CornerRule::AllCornersInside),
        );
        assert!(!all.included);

        let majority = classify_pixel(
            &pixel,
            &poly,
            PixelPolyMode::CustomBoundary(CornerRule::MajorityCornersInside),
        );
        assert!(!majority.included);

        // Fully inside: all rules agree.
        let pixel = Envelope::new(2.0, 2.0, 3.0, 3.0);
        for rule in [
            CornerRule::AnyCornerInside,
            CornerRule::AllCornersInside,
            CornerRule::MajorityCornersInside,
        ] {
            let result = classify_pixel(&pixel, &poly, PixelPolyMode::CustomBoundary(rule));
            assert!(result.included, "rule {rule:?} should include");
        }
    }

    #[test]
    fn test_validate_polygon_rejects_degenerate() {
        // Zero-area sliver.
        let sliver = polygon![
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 0.0),
            (x: 0.0, y: 0.0),
        ];
        assert!(validate_polygon(&sliver).is_err());

        let ok = square(0.0, 0.0, 1.0, 1.0);
        assert!(validate_polygon(&ok).is_ok());
    }

    #[test]
    fn test_validate_polygon_rejects_non_finite() {
        let bad = polygon![
            (x: 0.0, y: 0.0),
            (x: f64::NAN, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        assert!(validate_polygon(&bad).is_err());
    }
}
