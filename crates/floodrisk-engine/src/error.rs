//! Engine error types.

use floodrisk_core::CoreError;
use floodrisk_math::MathError;
use thiserror::Error;

/// Engine result type.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid parameter, I/O failure, or dimension mismatch.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Integration error
    #[error("integration error: {0}")]
    Math(#[from] MathError),

    /// Thread pool could not be created
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl EngineError {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Core(err) => err.kind(),
            Self::Math(MathError::InsufficientData { .. }) => "InsufficientData",
            Self::Math(MathError::InvalidInput { .. }) => "InvalidParameter",
            Self::ThreadPool(_) => "ThreadPool",
        }
    }
}
