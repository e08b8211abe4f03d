//! Numerical integration.
//!
//! Only the composite trapezoidal rule is provided. Intervals are formed
//! between consecutive points in the order given and each interval width is
//! taken as an absolute value, so a curve sampled from high to low abscissa
//! integrates to the same positive area as its mirror.

mod trapezoid;

pub use trapezoid::{
    fold_trapezoids, trapezoid_area, trapezoid_area_split, trapezoid_widths,
    trapezoid_with_widths,
};
