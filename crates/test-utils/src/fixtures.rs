//! Geometry fixtures shared across the test suite.

use geo::{polygon, Polygon};

/// An axis-aligned rectangular polygon as a closed 5-vertex ring.
pub fn rect_polygon(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    polygon![
        (x: min_x, y: min_y),
        (x: max_x, y: min_y),
        (x: max_x, y: max_y),
        (x: min_x, y: max_y),
        (x: min_x, y: min_y),
    ]
}

/// A right triangle with legs along the south and west edges of the given
/// square, covering exactly half its area.
pub fn half_square_triangle(min_x: f64, min_y: f64, size: f64) -> Polygon<f64> {
    polygon![
        (x: min_x, y: min_y),
        (x: min_x + size, y: min_y),
        (x: min_x, y: min_y + size),
        (x: min_x, y: min_y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_rect_polygon_area() {
        let poly = rect_polygon(0.0, 0.0, 4.0, 3.0);
        assert_eq!(poly.unsigned_area(), 12.0);
    }

    #[test]
    fn test_half_square_triangle_area() {
        let poly = half_square_triangle(0.0, 0.0, 4.0);
        assert_eq!(poly.unsigned_area(), 8.0);
    }
}
