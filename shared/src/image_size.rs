//! Image dimensions and size utilities

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image dimensions structure
///
/// Represents the width and height of a camera frame. Arrays created from it
/// are row-major: rows (height) come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
}

impl ImageSize {
    /// Create a new ImageSize
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Size of an ndarray with shape `(rows, cols)`
    pub fn from_shape(shape: (usize, usize)) -> Self {
        Self {
            width: shape.1,
            height: shape.0,
        }
    }

    /// ndarray shape `(rows, cols)` for this size
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Zero-filled f64 grid with this size
    pub fn zeros(&self) -> Array2<f64> {
        Array2::zeros(self.shape())
    }

    /// Boolean grid with every pixel set to `value`
    pub fn mask(&self, value: bool) -> Array2<bool> {
        Array2::from_elem(self.shape(), value)
    }

    /// Get total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// True when `(x, y)` lies strictly inside `(0, width) × (0, height)`
    pub fn contains_strict(&self, x: f64, y: f64) -> bool {
        x > 0.0 && x < self.width as f64 && y > 0.0 && y < self.height as f64
    }

    /// Convert to tuple (width, height)
    pub fn to_tuple(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl From<(usize, usize)> for ImageSize {
    fn from(dimensions: (usize, usize)) -> Self {
        Self::from_width_height(dimensions.0, dimensions.1)
    }
}

impl From<ImageSize> for (usize, usize) {
    fn from(size: ImageSize) -> Self {
        size.to_tuple()
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
