//! Size of the connected bright region at the centre of a window

use ndarray::ArrayView2;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlobError {
    #[error("blob threshold must be positive, got {0}")]
    NonPositiveThreshold(f64),
    #[error("blob window must have odd dimensions, got {rows}x{cols}")]
    EvenWindow { rows: usize, cols: usize },
}

/// Count the 8-connected pixels `≥ threshold` reachable from the window
/// centre, stopping early once `limit` is reached (`0` means the window area).
///
/// Non-finite pixels count as zero. The count includes the centre only when
/// it is itself above threshold.
pub fn blob_size(window: &ArrayView2<f64>, threshold: f64, limit: usize) -> Result<usize, BlobError> {
    if threshold.is_nan() || threshold <= 0.0 {
        return Err(BlobError::NonPositiveThreshold(threshold));
    }
    let (rows, cols) = window.dim();
    if rows % 2 == 0 || cols % 2 == 0 {
        return Err(BlobError::EvenWindow { rows, cols });
    }

    let area = rows * cols;
    let limit = if limit == 0 { area } else { limit };

    let has_nan = window.iter().any(|v| v.is_nan());
    let min = window.iter().cloned().fold(f64::INFINITY, f64::min);
    if !has_nan && threshold <= min {
        return Ok(limit.min(area));
    }

    let mut work = window.mapv(|v| if v.is_finite() { v } else { 0.0 });
    let mut queue = VecDeque::from([(rows / 2, cols / 2)]);
    let mut count = 0;

    while let Some((r, c)) = queue.pop_front() {
        for dr in -1isize..=1 {
            for dc in -1isize..=1 {
                let nr = r as isize + dr;
                let nc = c as isize + dc;
                if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                    continue;
                }
                let (nr, nc) = (nr as usize, nc as usize);
                if work[[nr, nc]] >= threshold {
                    count += 1;
                    work[[nr, nc]] = 0.0;
                    queue.push_back((nr, nc));
                }
            }
        }
        if count >= limit {
            return Ok(limit);
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    #[test]
    fn test_uniform_window_returns_area_or_limit() {
        let window = Array2::from_elem((5, 5), 1.0);
        assert_eq!(blob_size(&window.view(), 0.5, 0), Ok(25));
        assert_eq!(blob_size(&window.view(), 0.5, 10), Ok(10));
        assert_eq!(blob_size(&window.view(), 1.0, 100), Ok(25));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let window = Array2::from_elem((5, 5), 1.0);
        assert_eq!(
            blob_size(&window.view(), 0.0, 0),
            Err(BlobError::NonPositiveThreshold(0.0))
        );
        assert!(blob_size(&window.view(), -1.0, 0).is_err());
        let even = Array2::from_elem((4, 5), 1.0);
        assert_eq!(
            blob_size(&even.view(), 0.5, 0),
            Err(BlobError::EvenWindow { rows: 4, cols: 5 })
        );
    }

    #[test]
    fn test_counts_connected_region_only() {
        let window = arr2(&[
            [0.0, 0.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0],
        ]);
        // Centre plus two diagonal neighbours; the right edge pair is separate
        assert_eq!(blob_size(&window.view(), 0.5, 0), Ok(3));
    }

    #[test]
    fn test_dark_centre_still_reaches_neighbours() {
        let window = arr2(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]]);
        assert_eq!(blob_size(&window.view(), 0.5, 0), Ok(2));
    }

    #[test]
    fn test_early_exit_at_limit() {
        let mut window = Array2::zeros((7, 7));
        window.row_mut(3).fill(1.0);
        assert_eq!(blob_size(&window.view(), 0.5, 3), Ok(3));
        assert_eq!(blob_size(&window.view(), 0.5, 0), Ok(7));
    }

    #[test]
    fn test_nan_counts_as_dark() {
        let window = arr2(&[[1.0, 1.0, 1.0], [1.0, 1.0, f64::NAN], [1.0, 1.0, 1.0]]);
        assert_eq!(blob_size(&window.view(), 0.5, 0), Ok(8));
    }
}
