use std::path::PathBuf;

use ephemeris::EphemerisError;
use shared::image_proc::{BlobError, ImageProcError};
use shared::ImageSize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkycamError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("configuration is not valid JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("catalog {path} is unreadable: {source}")]
    CatalogUnreadable { path: PathBuf, source: csv::Error },

    #[error("failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("cannot parse a timestamp from '{name}' with format '{format}'")]
    Timestamp { name: String, format: String },

    #[error("resolution mismatch: configured {expected}, image is {actual}")]
    ResolutionMismatch {
        expected: ImageSize,
        actual: ImageSize,
    },

    #[error("no stars left in the working set")]
    EmptyWorkingSet,

    #[error("unknown projection '{0}'")]
    UnknownProjection(String),

    #[error("unknown response function '{0}'")]
    UnknownResponseFunction(String),

    #[error("unknown air mass model '{0}'")]
    UnknownAirmassModel(String),

    #[error("search radius must not be negative, got {0}")]
    NegativeRadius(f64),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    ImageProc(#[from] ImageProcError),

    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

impl SkycamError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SkycamError::Io {
            path: path.into(),
            source,
        }
    }
}
