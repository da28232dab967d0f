//! NaN-ignoring statistics and 2-D histograms

use ndarray::{Array2, ArrayView2};

use crate::ImageSize;

/// Mean of the non-NaN values, `None` if there are none
pub fn nan_mean(grid: &ArrayView2<f64>) -> Option<f64> {
    let (sum, count) = grid
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Population standard deviation of the non-NaN values
pub fn nan_std(grid: &ArrayView2<f64>) -> Option<f64> {
    let mean = nan_mean(grid)?;
    let (sum_sq, count) = grid
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), &v| (s + (v - mean).powi(2), n + 1));
    Some((sum_sq / count as f64).sqrt())
}

/// Maximum of the non-NaN values
pub fn nan_max(grid: &ArrayView2<f64>) -> Option<f64> {
    grid.iter()
        .filter(|v| !v.is_nan())
        .cloned()
        .reduce(f64::max)
}

/// Weighted 2-D histogram with one bin per pixel.
///
/// Each sample `(x, y, weight)` lands in bin `[floor(y), floor(x)]`; samples
/// on the far edge (`x == width` or `y == height`) go into the last bin and
/// anything else outside the image is discarded.
pub fn histogram2d<I>(samples: I, size: ImageSize) -> Array2<f64>
where
    I: IntoIterator<Item = (f64, f64, f64)>,
{
    let mut hist = size.zeros();
    let (w, h) = (size.width as f64, size.height as f64);

    for (x, y, weight) in samples {
        if !(0.0..=w).contains(&x) || !(0.0..=h).contains(&y) {
            continue;
        }
        let col = (x.floor() as usize).min(size.width.saturating_sub(1));
        let row = (y.floor() as usize).min(size.height.saturating_sub(1));
        hist[[row, col]] += weight;
    }

    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn test_nan_mean_and_std() {
        let grid = arr2(&[[1.0, f64::NAN], [3.0, 5.0]]);
        assert_relative_eq!(nan_mean(&grid.view()).unwrap(), 3.0);
        assert_relative_eq!(nan_std(&grid.view()).unwrap(), (8.0_f64 / 3.0).sqrt());
        assert_eq!(nan_max(&grid.view()), Some(5.0));
    }

    #[test]
    fn test_all_nan() {
        let grid = Array2::from_elem((2, 2), f64::NAN);
        assert_eq!(nan_mean(&grid.view()), None);
        assert_eq!(nan_std(&grid.view()), None);
        assert_eq!(nan_max(&grid.view()), None);
    }

    #[test]
    fn test_histogram_bins_and_weights() {
        let size = ImageSize::from_width_height(4, 3);
        let hist = histogram2d(
            vec![
                (0.5, 0.5, 1.0),
                (0.9, 0.1, 2.0),
                (3.2, 2.7, 0.5),
                (4.0, 3.0, 1.0), // far edge, last bin
                (5.0, 1.0, 9.0), // outside
            ],
            size,
        );
        assert_eq!(hist.dim(), (3, 4));
        assert_eq!(hist[[0, 0]], 3.0);
        assert_eq!(hist[[2, 3]], 1.5);
        assert_relative_eq!(hist.sum(), 4.5);
    }
}
