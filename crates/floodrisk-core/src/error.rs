//! Error types for the Floodrisk library.
//!
//! This module defines the error taxonomy shared by every crate in the
//! workspace. All variants abort the current integration pass.

use thiserror::Error;

/// A specialized Result type for Floodrisk operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The main error type for Floodrisk operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A caller-supplied parameter is out of its valid domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter or input.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A grid could not be opened, read, or written.
    #[error("I/O failure on '{path}': {reason}")]
    IoFailure {
        /// Path (or label) of the grid involved.
        path: String,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Two grids that must be co-registered have different shapes.
    #[error(
        "Dimension mismatch for '{name}': expected {}x{}, got {}x{}",
        .expected.0, .expected.1, .actual.0, .actual.1
    )]
    DimensionMismatch {
        /// Name of the grid that does not match.
        name: String,
        /// Expected (rows, cols).
        expected: (usize, usize),
        /// Actual (rows, cols).
        actual: (usize, usize),
    },

    /// Two grids of the same shape are placed differently on the ground.
    #[error("Georeference mismatch for '{name}': {reason}")]
    GeoReferenceMismatch {
        /// Name of the grid that does not match.
        name: String,
        /// Which part of the georeference differs.
        reason: String,
    },

    /// Not enough inputs to build a curve.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required count.
        required: usize,
        /// Actual count supplied.
        actual: usize,
    },

    /// Cell index outside the grid.
    #[error("Cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },
}

impl CoreError {
    /// Creates an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an I/O failure error.
    #[must_use]
    pub fn io_failure(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IoFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a dimension mismatch error.
    #[must_use]
    pub fn dimension_mismatch(
        name: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::DimensionMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Creates a georeference mismatch error.
    #[must_use]
    pub fn georeference_mismatch(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GeoReferenceMismatch {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::IoFailure { .. } => "IOFailure",
            Self::DimensionMismatch { .. } | Self::GeoReferenceMismatch { .. } => "DimensionMismatch",
            Self::InsufficientData { .. } => "InsufficientData",
            Self::OutOfBounds { .. } => "OutOfBounds",
        }
    }
}
