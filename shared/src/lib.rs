//! Image-processing building blocks for all-sky camera frames.
//!
//! Everything here works on `ndarray::Array2<f64>` grids indexed `[row, col]`
//! (`[y, x]`), with NaN marking pixels that must not contribute to any
//! statistic.

pub mod image_proc;
pub mod image_size;

pub use image_size::ImageSize;
