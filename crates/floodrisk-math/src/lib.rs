//! # Floodrisk Math
//!
//! Numerical utilities for the Floodrisk expected annual loss library.
//!
//! This crate provides:
//!
//! - **Integration**: Trapezoidal-rule area under piecewise-linear curves,
//!   paired in input order with absolute interval widths
//!
//! ## Design Philosophy
//!
//! - **Order Preserving**: Curve points are never re-sorted
//! - **IEEE Semantics**: NaN and infinity propagate, they are not trapped
//! - **Allocation Free Hot Path**: Widths are precomputed once per curve

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod integration;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::integration::{
        trapezoid_area, trapezoid_area_split, trapezoid_widths, trapezoid_with_widths,
    };
}

pub use error::{MathError, MathResult};
