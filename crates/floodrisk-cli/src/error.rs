//! CLI error types.

use floodrisk_config::ConfigError;
use floodrisk_engine::EngineError;
use floodrisk_raster::RasterError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input raster is missing.
    #[error("{0} does not exist")]
    MissingInput(String),

    /// Inconsistent command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Raster I/O error.
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// Engine error.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Report or console output error.
    #[error("Output error on {path}: {reason}")]
    Output {
        /// Destination.
        path: String,
        /// What went wrong.
        reason: String,
    },
}

impl CliError {
    /// Failure kind shown in front of the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingInput(_) | Self::Raster(_) | Self::Output { .. } => "IOFailure",
            Self::Usage(_) | Self::Config(_) => "InvalidParameter",
            Self::Engine(err) => err.kind(),
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use floodrisk_core::CoreError;

    #[test]
    fn test_missing_input_message() {
        let err = CliError::MissingInput("map3.tif".into());
        assert_eq!(err.to_string(), "map3.tif does not exist");
        assert_eq!(err.kind(), "IOFailure");
    }

    #[test]
    fn test_engine_kind_passes_through() {
        let err: CliError = EngineError::from(CoreError::dimension_mismatch("b.tif", (2, 2), (3, 2))).into();
        assert_eq!(err.kind(), "DimensionMismatch");
        assert!(err.to_string().contains("b.tif"));
    }
}
