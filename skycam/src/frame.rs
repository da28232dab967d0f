//! Camera frames: decoded pixels, capture time and content hash

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use image::DynamicImage;
use ndarray::Array2;
use shared::ImageSize;
use std::path::{Path, PathBuf};

use crate::config::Properties;
use crate::SkycamError;

/// A grayscale frame with values in `[0, 1]`
#[derive(Debug, Clone)]
pub struct Frame {
    pub pixels: Array2<f64>,
    pub timestamp: DateTime<Utc>,
    /// Hex md5 of the pixel data
    pub hash: String,
    pub source: Option<PathBuf>,
}

impl Frame {
    pub fn new(pixels: Array2<f64>, timestamp: DateTime<Utc>) -> Self {
        let hash = content_hash(&pixels);
        Self {
            pixels,
            timestamp,
            hash,
            source: None,
        }
    }

    /// Convert a decoded image to grayscale
    pub fn from_image(image: &DynamicImage, timestamp: DateTime<Utc>) -> Self {
        let gray = image.to_luma32f();
        let (width, height) = gray.dimensions();
        let pixels = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            f64::from(gray.get_pixel(col as u32, row as u32).0[0])
        });
        Self::new(pixels, timestamp)
    }

    /// Decode an image file; the capture time is parsed from its file name
    pub fn load(path: &Path, properties: &Properties) -> Result<Self, SkycamError> {
        let timestamp = timestamp_from_path(path, &properties.time_format, properties.time_offset_minutes)?;
        let image = image::open(path).map_err(|source| SkycamError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let mut frame = Self::from_image(&image, timestamp);
        frame.source = Some(path.to_path_buf());
        log::debug!(
            "Loaded {} ({}x{}) taken at {}",
            path.display(),
            frame.pixels.ncols(),
            frame.pixels.nrows(),
            frame.timestamp
        );
        Ok(frame)
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::from_shape(self.pixels.dim())
    }
}

/// md5 over the little-endian bytes of every pixel, row-major
pub fn content_hash(pixels: &Array2<f64>) -> String {
    let mut context = md5::Context::new();
    for value in pixels.iter() {
        context.consume(value.to_le_bytes());
    }
    format!("{:x}", context.compute())
}

/// Parse the capture time from the file stem with a `chrono` format string,
/// then shift it by `offset_minutes`
pub fn timestamp_from_path(
    path: &Path,
    format: &str,
    offset_minutes: f64,
) -> Result<DateTime<Utc>, SkycamError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let naive = NaiveDateTime::parse_from_str(stem, format).map_err(|_| SkycamError::Timestamp {
        name: stem.to_string(),
        format: format.to_string(),
    })?;
    let offset = Duration::milliseconds((offset_minutes * 60_000.0).round() as i64);
    Ok(naive.and_utc() + offset)
}
