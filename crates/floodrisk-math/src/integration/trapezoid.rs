//! Composite trapezoidal rule over ordered points.

use crate::error::{MathError, MathResult};

/// Area under the piecewise-linear curve through `points`.
///
/// Computes
///
/// ```text
/// sum_i (y[i] + y[i+1]) * |x[i+1] - x[i]| / 2
/// ```
///
/// pairing points in the order supplied. The halving is applied once to the
/// full sum.
///
/// # Example
///
/// ```rust
/// use floodrisk_math::integration::trapezoid_area;
///
/// // Frequencies of the 1-in-2 .. 1-in-100 year events and their losses.
/// let points = [(0.5, 100.0), (0.1, 200.0), (0.02, 300.0), (0.01, 400.0)];
/// let area = trapezoid_area(&points).unwrap();
/// assert!((area - 83.5).abs() < 1e-9);
/// ```
///
/// # Errors
///
/// Returns `MathError::InsufficientData` if fewer than two points are given.
pub fn trapezoid_area(points: &[(f64, f64)]) -> MathResult<f64> {
    if points.len() < 2 {
        return Err(MathError::insufficient_data(2, points.len()));
    }

    let sum: f64 = points
        .windows(2)
        .map(|w| (w[0].1 + w[1].1) * (w[1].0 - w[0].0).abs())
        .sum();

    Ok(sum / 2.0)
}

/// Same as [`trapezoid_area`] with abscissae and ordinates in separate slices.
///
/// # Errors
///
/// Returns an error if the slices differ in length or hold fewer than two points.
pub fn trapezoid_area_split(xs: &[f64], ys: &[f64]) -> MathResult<f64> {
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    let widths = trapezoid_widths(xs)?;
    Ok(fold_trapezoids(&widths, ys))
}

/// Absolute interval widths `|x[i+1] - x[i]|` for a fixed set of abscissae.
///
/// # Errors
///
/// Returns `MathError::InsufficientData` if fewer than two abscissae are given.
pub fn trapezoid_widths(xs: &[f64]) -> MathResult<Vec<f64>> {
    if xs.len() < 2 {
        return Err(MathError::insufficient_data(2, xs.len()));
    }
    Ok(xs.windows(2).map(|w| (w[1] - w[0]).abs()).collect())
}

/// Evaluates the rule with widths from [`trapezoid_widths`].
///
/// # Errors
///
/// Returns `MathError::InvalidInput` unless `ys.len() == widths.len() + 1`.
pub fn trapezoid_with_widths(widths: &[f64], ys: &[f64]) -> MathResult<f64> {
    if widths.is_empty() {
        return Err(MathError::insufficient_data(2, ys.len()));
    }
    if ys.len() != widths.len() + 1 {
        return Err(MathError::invalid_input(format!(
            "expected {} ordinates for {} widths, got {}",
            widths.len() + 1,
            widths.len(),
            ys.len()
        )));
    }
    Ok(fold_trapezoids(widths, ys))
}

/// Unchecked kernel shared by the functions above.
///
/// Extra ordinates beyond `widths.len() + 1` are ignored; missing ones
/// shorten the sum. Callers that cannot guarantee the lengths should use
/// [`trapezoid_with_widths`].
#[inline]
pub fn fold_trapezoids(widths: &[f64], ys: &[f64]) -> f64 {
    let sum: f64 = widths
        .iter()
        .zip(ys.windows(2))
        .map(|(w, pair)| (pair[0] + pair[1]) * w)
        .sum();
    sum / 2.0
}
