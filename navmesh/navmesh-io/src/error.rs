//! Error types for navmesh file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for navmesh file operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading meshes or writing reports.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The coordinate arrays of an import have different lengths.
    #[error("coordinate arrays differ in length: x={x}, y={y}, z={z}")]
    MismatchedCoordinates {
        /// Length of the `x` array.
        x: usize,
        /// Length of the `y` array.
        y: usize,
        /// Length of the `z` array.
        z: usize,
    },

    /// Invalid file content that parsed as JSON.
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax or shape error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Map an error from opening `path`, turning `NotFound` into [`IoError::FileNotFound`].
    pub(crate) fn from_open(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(error)
        }
    }
}
