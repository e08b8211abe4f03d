//! # Floodrisk Core
//!
//! Core types, traits, and abstractions for the Floodrisk expected annual loss library.
//!
//! This crate provides the foundational building blocks used throughout Floodrisk:
//!
//! - **Types**: Domain-specific types like `ReturnPeriod`, `Frequency`, `CurvePoint`, `NetRisk`
//! - **Grids**: The `Grid<T>` container with its `GeoReference` and no-data sentinel
//! - **Traits**: Read/write access to grids at the I/O seam (`GridSource`, `GridSink`)
//!
//! ## Design Philosophy
//!
//! - **Type Safety**: A `Frequency` can only come from a positive `ReturnPeriod`
//! - **Opaque Georeferencing**: Spatial reference is carried, never interpreted
//! - **Explicit Over Implicit**: Shape mismatches are errors, not undefined behaviour
//!
//! ## Example
//!
//! ```rust
//! use floodrisk_core::prelude::*;
//!
//! let ari = ReturnPeriod::new(100).unwrap();
//! assert_eq!(ari.frequency().value(), 0.01);
//!
//! let grid = Grid::new(2, 3, 0.0_f64);
//! assert_eq!(grid.shape(), (2, 3));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod grid;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::grid::{GeoReference, Grid};
    pub use crate::traits::{GridShape, GridSink, GridSource};
    pub use crate::types::{CurvePoint, Frequency, NetRisk, ReturnPeriod, RiskValue};
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use grid::{GeoReference, Grid};
pub use types::{CurvePoint, Frequency, NetRisk, ReturnPeriod, RiskValue};
pub use traits::{GridShape, GridSink, GridSource};
