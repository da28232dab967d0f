//! Image processing primitives: filters, masks, window searches, blob sizing,
//! connected components and NaN-aware statistics.

pub mod blob;
pub mod filters;
pub mod mask;
pub mod stats;
pub mod thresholding;
pub mod window;

pub use blob::{blob_size, BlobError};
pub use filters::EdgeMode;

use thiserror::Error;

/// Errors raised when grids passed together do not agree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageProcError {
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// Check that two grids have the same `(rows, cols)` shape
pub fn ensure_same_shape(
    expected: (usize, usize),
    actual: (usize, usize),
) -> Result<(), ImageProcError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ImageProcError::ShapeMismatch { expected, actual })
    }
}
