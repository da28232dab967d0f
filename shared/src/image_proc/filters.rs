//! Linear filters on f64 grids
//!
//! Gaussian smoothing is separable and runs one axis at a time; the 3×3
//! operators (Laplacian, Sobel) are applied directly. All filters propagate
//! NaN into every output pixel whose footprint touches a NaN input, so masked
//! regions grow by the filter radius instead of being silently zero-filled.

use ndarray::{Array2, ArrayView2, Axis, Zip};

/// Gaussian kernels are cut off at this many standard deviations
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Ratio between the wide and narrow Gaussian in a difference of Gaussians
pub const DOG_SIGMA_RATIO: f64 = 1.6;

/// Discrete 3×3 Laplacian, sign chosen so point sources give a positive peak
pub const LAPLACE_KERNEL: [[f64; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 0.0]];

/// Horizontal-edge Sobel kernel, normalised so a unit step gives a response of 1
pub const SOBEL_H_KERNEL: [[f64; 3]; 3] = [
    [0.25, 0.5, 0.25],
    [0.0, 0.0, 0.0],
    [-0.25, -0.5, -0.25],
];

/// Vertical-edge Sobel kernel (transpose of [`SOBEL_H_KERNEL`])
pub const SOBEL_V_KERNEL: [[f64; 3]; 3] = [
    [0.25, 0.0, -0.25],
    [0.5, 0.0, -0.5],
    [0.25, 0.0, -0.25],
];

/// Edge handling modes for filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeMode {
    /// Uses a constant value for pixels outside image bounds
    Constant(f64),

    /// Reflects about the edge, repeating the edge pixel: `d c b a | a b c d | d c b a`
    Reflect,

    /// Reflects about the edge pixel centre: `d c b | a b c d | c b a`
    Mirror,

    /// Extends the edge pixels outward: `a a a | a b c d | d d d`
    Nearest,

    /// Wraps around to the other side of the image
    Wrap,
}

impl EdgeMode {
    /// Map a possibly out-of-range index onto `[0, len)`.
    ///
    /// Returns `None` when the constant fill value must be used instead.
    fn resolve(&self, index: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&index) {
            return Some(index as usize);
        }
        match self {
            EdgeMode::Constant(_) => None,
            EdgeMode::Nearest => Some(index.clamp(0, n - 1) as usize),
            EdgeMode::Wrap => Some(index.rem_euclid(n) as usize),
            EdgeMode::Reflect => {
                let period = 2 * n;
                let i = index.rem_euclid(period);
                let reflected = if i < n { i } else { period - 1 - i };
                Some(reflected as usize)
            }
            EdgeMode::Mirror => {
                if n == 1 {
                    return Some(0);
                }
                let period = 2 * n - 2;
                let i = index.rem_euclid(period);
                let mirrored = if i < n { i } else { period - i };
                Some(mirrored as usize)
            }
        }
    }

    fn fill(&self) -> f64 {
        match self {
            EdgeMode::Constant(value) => *value,
            _ => 0.0,
        }
    }
}

/// Pixel lookup with boundary handling
fn pixel_at(input: &ArrayView2<f64>, row: isize, col: isize, mode: EdgeMode) -> f64 {
    let (rows, cols) = input.dim();
    match (mode.resolve(row, rows), mode.resolve(col, cols)) {
        (Some(r), Some(c)) => input[[r, c]],
        _ => mode.fill(),
    }
}

/// Normalised 1-D Gaussian weights of radius `round(truncate·σ)`
pub fn gaussian_kernel_1d(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as isize;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut weights: Vec<f64> = (-radius..=radius)
        .map(|i| (-((i * i) as f64) / two_sigma_sq).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.iter_mut().for_each(|w| *w /= sum);
    weights
}

/// Correlate every line along `axis` with a centred 1-D kernel
pub fn correlate1d(
    input: &ArrayView2<f64>,
    weights: &[f64],
    axis: Axis,
    mode: EdgeMode,
) -> Array2<f64> {
    let origin = (weights.len() / 2) as isize;
    let mut output = Array2::zeros(input.dim());

    Zip::indexed(&mut output).par_for_each(|(r, c), out| {
        let mut sum = 0.0;
        for (k, &w) in weights.iter().enumerate() {
            let offset = k as isize - origin;
            let (rr, cc) = if axis == Axis(0) {
                (r as isize + offset, c as isize)
            } else {
                (r as isize, c as isize + offset)
            };
            sum += w * pixel_at(input, rr, cc, mode);
        }
        *out = sum;
    });

    output
}

/// Separable Gaussian blur with standard deviation `sigma` on both axes.
///
/// A non-positive sigma leaves the image unchanged.
pub fn gaussian_filter(input: &ArrayView2<f64>, sigma: f64, mode: EdgeMode) -> Array2<f64> {
    if sigma <= 0.0 {
        return input.to_owned();
    }
    let weights = gaussian_kernel_1d(sigma, GAUSSIAN_TRUNCATE);
    let rows_done = correlate1d(input, &weights, Axis(0), mode);
    correlate1d(&rows_done.view(), &weights, Axis(1), mode)
}

/// Correlate with a 3×3 kernel
pub fn correlate3x3(input: &ArrayView2<f64>, kernel: &[[f64; 3]; 3], mode: EdgeMode) -> Array2<f64> {
    let mut output = Array2::zeros(input.dim());

    Zip::indexed(&mut output).par_for_each(|(r, c), out| {
        let mut sum = 0.0;
        for (ki, kernel_row) in kernel.iter().enumerate() {
            for (kj, &w) in kernel_row.iter().enumerate() {
                if w == 0.0 {
                    continue;
                }
                let rr = r as isize + ki as isize - 1;
                let cc = c as isize + kj as isize - 1;
                sum += w * pixel_at(input, rr, cc, mode);
            }
        }
        *out = sum;
    });

    output
}

/// Laplacian of the image with reflected borders
pub fn laplace(input: &ArrayView2<f64>) -> Array2<f64> {
    correlate3x3(input, &LAPLACE_KERNEL, EdgeMode::Reflect)
}

/// Laplacian of Gaussian: blur with `sigma` (nearest borders), then [`laplace`]
pub fn laplacian_of_gaussian(input: &ArrayView2<f64>, sigma: f64) -> Array2<f64> {
    let smoothed = gaussian_filter(input, sigma, EdgeMode::Nearest);
    laplace(&smoothed.view())
}

/// `G(σ) − G(1.6σ)`, both with nearest borders
pub fn difference_of_gaussians(input: &ArrayView2<f64>, sigma: f64) -> Array2<f64> {
    let narrow = gaussian_filter(input, sigma, EdgeMode::Nearest);
    let wide = gaussian_filter(input, DOG_SIGMA_RATIO * sigma, EdgeMode::Nearest);
    narrow - wide
}

/// Sobel edge magnitude `sqrt((h² + v²) / 2)`.
///
/// The one-pixel image border is set to zero because its gradient is only
/// defined through the boundary extension.
pub fn sobel(input: &ArrayView2<f64>) -> Array2<f64> {
    let h = correlate3x3(input, &SOBEL_H_KERNEL, EdgeMode::Reflect);
    let v = correlate3x3(input, &SOBEL_V_KERNEL, EdgeMode::Reflect);

    let mut magnitude = Zip::from(&h)
        .and(&v)
        .map_collect(|&a, &b| ((a * a + b * b) / 2.0).sqrt());

    let (rows, cols) = magnitude.dim();
    if rows > 0 && cols > 0 {
        magnitude.row_mut(0).fill(0.0);
        magnitude.row_mut(rows - 1).fill(0.0);
        magnitude.column_mut(0).fill(0.0);
        magnitude.column_mut(cols - 1).fill(0.0);
    }
    magnitude
}

/// Sum of squared positive backward differences along both axes.
///
/// The first row and column compare against the last (wrap-around).
pub fn squared_gradient(input: &ArrayView2<f64>) -> Array2<f64> {
    let (rows, cols) = input.dim();
    let mut output = Array2::zeros((rows, cols));

    Zip::indexed(&mut output).par_for_each(|(r, c), out| {
        let value = input[[r, c]];
        let up = input[[(r + rows - 1) % rows, c]];
        let left = input[[r, (c + cols - 1) % cols]];
        let dy = clip_negative(value - up);
        let dx = clip_negative(value - left);
        *out = dy * dy + dx * dx;
    });

    output
}

/// Clamp negative values to zero while keeping NaN
#[inline]
pub fn clip_negative(value: f64) -> f64 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

/// In-place [`clip_negative`] over a grid
pub fn clip_negative_inplace(grid: &mut Array2<f64>) {
    grid.mapv_inplace(clip_negative);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{arr2, Array2};
    use rstest::rstest;

    #[rstest]
    #[case(EdgeMode::Reflect, -1, 0)]
    #[case(EdgeMode::Reflect, -2, 1)]
    #[case(EdgeMode::Reflect, 4, 3)]
    #[case(EdgeMode::Reflect, 5, 2)]
    #[case(EdgeMode::Mirror, -1, 1)]
    #[case(EdgeMode::Mirror, 4, 2)]
    #[case(EdgeMode::Nearest, -3, 0)]
    #[case(EdgeMode::Nearest, 9, 3)]
    #[case(EdgeMode::Wrap, -1, 3)]
    #[case(EdgeMode::Wrap, 4, 0)]
    fn test_edge_mode_resolve(#[case] mode: EdgeMode, #[case] index: isize, #[case] expected: usize) {
        assert_eq!(mode.resolve(index, 4), Some(expected));
    }

    #[test]
    fn test_constant_mode_uses_fill() {
        let image = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(pixel_at(&image.view(), -1, 0, EdgeMode::Constant(7.0)), 7.0);
        assert_eq!(pixel_at(&image.view(), 1, 1, EdgeMode::Constant(7.0)), 4.0);
    }

    #[test]
    fn test_gaussian_kernel_normalised_and_symmetric() {
        let kernel = gaussian_kernel_1d(2.0, GAUSSIAN_TRUNCATE);
        assert_eq!(kernel.len(), 17);
        assert_relative_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        for i in 0..kernel.len() / 2 {
            assert_relative_eq!(kernel[i], kernel[kernel.len() - 1 - i], epsilon = 1e-15);
        }
        assert!(kernel[8] > kernel[7]);
    }

    #[rstest]
    #[case(EdgeMode::Nearest)]
    #[case(EdgeMode::Mirror)]
    #[case(EdgeMode::Reflect)]
    fn test_gaussian_preserves_constant_image(#[case] mode: EdgeMode) {
        let image = Array2::from_elem((12, 9), 3.5);
        let blurred = gaussian_filter(&image.view(), 1.5, mode);
        for &v in blurred.iter() {
            assert_relative_eq!(v, 3.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gaussian_mirror_conserves_flux_away_from_edges() {
        let mut image = Array2::zeros((41, 41));
        image[[20, 20]] = 1.0;
        let blurred = gaussian_filter(&image.view(), 2.0, EdgeMode::Mirror);
        assert_relative_eq!(blurred.sum(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(blurred[[20, 21]], blurred[[21, 20]], epsilon = 1e-15);
        assert!(blurred[[20, 20]] > blurred[[20, 21]]);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let image = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(gaussian_filter(&image.view(), 0.0, EdgeMode::Nearest), image);
    }

    #[test]
    fn test_laplace_point_source() {
        let mut image = Array2::zeros((5, 5));
        image[[2, 2]] = 1.0;
        let lap = laplace(&image.view());
        assert_eq!(lap[[2, 2]], 4.0);
        assert_eq!(lap[[1, 2]], -1.0);
        assert_eq!(lap[[2, 3]], -1.0);
        assert_eq!(lap[[1, 1]], 0.0);
    }

    #[test]
    fn test_laplace_flat_image_is_zero() {
        let image = Array2::from_elem((4, 6), 0.3);
        assert!(laplace(&image.view()).iter().all(|v| v.abs() < 1e-15));
    }

    #[test]
    fn test_nan_propagates_through_filters() {
        let mut image = Array2::from_elem((9, 9), 1.0);
        image[[4, 4]] = f64::NAN;
        let lap = laplace(&image.view());
        assert!(lap[[4, 4]].is_nan());
        assert!(lap[[3, 4]].is_nan());
        assert!(!lap[[0, 0]].is_nan());
    }

    #[test]
    fn test_sobel_step_edge() {
        let mut image = Array2::zeros((6, 6));
        for r in 0..6 {
            for c in 3..6 {
                image[[r, c]] = 1.0;
            }
        }
        let edges = sobel(&image.view());
        // Vertical edge between columns 2 and 3
        assert_relative_eq!(edges[[2, 2]], 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(edges[[2, 3]], 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(edges[[2, 1]], 0.0);
        // Border zeroed
        assert_eq!(edges[[0, 2]], 0.0);
        assert_eq!(edges[[2, 5]], 0.0);
    }

    #[test]
    fn test_squared_gradient_wraps() {
        let image = arr2(&[[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 2.0]]);
        let grad = squared_gradient(&image.view());
        // Rising against the wrapped bottom row and the left neighbour
        assert_eq!(grad[[0, 1]], 2.0);
        // Falling edges are clipped
        assert_eq!(grad[[0, 2]], 0.0);
        assert_eq!(grad[[1, 1]], 0.0);
        // Bottom-right: above is 0, left is 0
        assert_eq!(grad[[2, 2]], 8.0);
        // Wrap: (0,0) compares with (2,0) and (0,2)
        assert_eq!(grad[[0, 0]], 0.0);
    }

    #[test]
    fn test_difference_of_gaussians_peaks_on_point() {
        let mut image = Array2::zeros((31, 31));
        image[[15, 15]] = 1.0;
        let dog = difference_of_gaussians(&image.view(), 1.5);
        let max = dog.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(dog[[15, 15]], max);
        assert!(dog[[15, 15]] > 0.0);
    }

    #[test]
    fn test_clip_negative_keeps_nan() {
        let mut grid = arr2(&[[-1.0, 2.0], [f64::NAN, 0.0]]);
        clip_negative_inplace(&mut grid);
        assert_eq!(grid[[0, 0]], 0.0);
        assert_eq!(grid[[0, 1]], 2.0);
        assert!(grid[[1, 0]].is_nan());
    }
}
