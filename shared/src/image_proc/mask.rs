//! Boolean exclusion masks (`true` = excluded pixel)

use ndarray::{Array2, ArrayView2, Zip};

use super::{ensure_same_shape, ImageProcError};
use crate::ImageSize;

/// Mask of pixels relative to a disk centred at `(center_x, center_y)`.
///
/// With `mask_inside` the pixels strictly inside the disk are excluded,
/// otherwise the pixels strictly outside it.
pub fn disk_mask(
    size: ImageSize,
    center_x: f64,
    center_y: f64,
    radius: f64,
    mask_inside: bool,
) -> Array2<bool> {
    let r_sq = radius * radius;
    Array2::from_shape_fn(size.shape(), |(row, col)| {
        let dy = row as f64 - center_y;
        let dx = col as f64 - center_x;
        let d_sq = dx * dx + dy * dy;
        if mask_inside {
            d_sq < r_sq
        } else {
            d_sq > r_sq
        }
    })
}

/// OR `other` into `mask`
pub fn union_inplace(
    mask: &mut Array2<bool>,
    other: &ArrayView2<bool>,
) -> Result<(), ImageProcError> {
    ensure_same_shape(mask.dim(), other.dim())?;
    Zip::from(mask).and(other).for_each(|m, &o| *m |= o);
    Ok(())
}

/// Overwrite every masked pixel of `grid` with `value`
pub fn fill_masked(
    grid: &mut Array2<f64>,
    mask: &ArrayView2<bool>,
    value: f64,
) -> Result<(), ImageProcError> {
    ensure_same_shape(grid.dim(), mask.dim())?;
    Zip::from(grid).and(mask).for_each(|g, &m| {
        if m {
            *g = value;
        }
    });
    Ok(())
}

/// Mark masked pixels as NaN so they drop out of every statistic
pub fn apply_nan_mask(grid: &mut Array2<f64>, mask: &ArrayView2<bool>) -> Result<(), ImageProcError> {
    fill_masked(grid, mask, f64::NAN)
}
