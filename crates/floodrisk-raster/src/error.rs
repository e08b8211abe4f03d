//! Raster I/O error types.

use std::path::Path;

use floodrisk_core::CoreError;
use thiserror::Error;

/// Raster operation result type.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors raised while opening, parsing, or writing raster files.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The file does not exist.
    #[error("{path} does not exist")]
    NotFound {
        /// Missing path.
        path: String,
    },

    /// The file extension or pixel layout is not supported.
    #[error("Unsupported raster format for {path}: {reason}")]
    UnsupportedFormat {
        /// Offending path.
        path: String,
        /// What is unsupported.
        reason: String,
    },

    /// The file content is malformed.
    #[error("Failed to parse {path} (line {line}): {reason}")]
    Parse {
        /// Offending path.
        path: String,
        /// 1-based line number, 0 when not applicable.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// The georeference cannot be expressed in the target format.
    #[error("Unsupported georeference for {path}: {reason}")]
    UnsupportedGeoreference {
        /// Offending path.
        path: String,
        /// Why it cannot be written.
        reason: String,
    },

    /// TIFF codec failure.
    #[error("TIFF error in {path}: {reason}")]
    Tiff {
        /// Offending path.
        path: String,
        /// Codec message.
        reason: String,
    },

    /// Underlying I/O failure.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

impl RasterError {
    /// Creates an I/O error bound to a path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(path: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Creates a TIFF codec error.
    pub fn tiff(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Tiff {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::UnsupportedFormat { path, .. }
            | Self::Parse { path, .. }
            | Self::UnsupportedGeoreference { path, .. }
            | Self::Tiff { path, .. }
            | Self::Io { path, .. } => path,
        }
    }
}

impl From<RasterError> for CoreError {
    fn from(err: RasterError) -> Self {
        CoreError::io_failure(err.path().to_string(), err.to_string())
    }
}
