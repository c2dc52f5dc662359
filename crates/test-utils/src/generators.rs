//! Synthetic raster generators for creating predictable test grids.
//!
//! These generators create deterministic, verifiable data patterns used
//! across the test suite.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data is being streamed correctly by
/// checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
///
/// Useful for conservation-style checks where the expected aggregate is
/// value * pixel count.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a gradient grid increasing left-to-right and top-to-bottom.
pub fn create_gradient_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x_factor = col as f32 / width.max(1) as f32;
            let y_factor = row as f32 / height.max(1) as f32;
            data.push(x_factor + y_factor);
        }
    }
    data
}

/// Creates a feature-ID grid split into vertical stripes.
///
/// Columns are divided evenly among `ids` in order; each pixel holds the
/// ID of its stripe. The per-ID pixel counts are therefore exactly
/// `stripe_width * height` (the last stripe absorbs the remainder).
pub fn create_id_stripe_grid(width: usize, height: usize, ids: &[i64]) -> Vec<f32> {
    assert!(!ids.is_empty(), "need at least one feature ID");
    let stripe = (width / ids.len()).max(1);
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let idx = (col / stripe).min(ids.len() - 1);
            data.push(ids[idx] as f32);
        }
    }
    data
}

/// Creates a grid with NaN values at specified positions.
///
/// Useful for testing missing data handling.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0); // col=0, row=0
        assert_eq!(grid[1], 1000.0); // col=1, row=0
        assert_eq!(grid[10], 1.0); // col=0, row=1
        assert_eq!(grid[11], 1001.0); // col=1, row=1
    }

    #[test]
    fn test_create_constant_grid() {
        let grid = create_constant_grid(10, 10, 42.0);
        assert_eq!(grid.len(), 100);
        assert!(grid.iter().all(|&v| v == 42.0));
    }

    #[test]
    fn test_create_id_stripe_grid() {
        let grid = create_id_stripe_grid(6, 2, &[7, 9]);
        // First three columns are 7, last three are 9, on both rows.
        assert_eq!(grid[0], 7.0);
        assert_eq!(grid[2], 7.0);
        assert_eq!(grid[3], 9.0);
        assert_eq!(grid[5], 9.0);
        assert_eq!(grid[6], 7.0);

        let sevens = grid.iter().filter(|&&v| v == 7.0).count();
        assert_eq!(sevens, 6);
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(10, 10, &[(5, 5), (0, 0)]);
        assert!(grid[0].is_nan()); // (0, 0)
        assert!(grid[55].is_nan()); // (5, 5) = row 5 * 10 + col 5
        assert!(!grid[1].is_nan()); // (1, 0) should be 0.0
    }
}
