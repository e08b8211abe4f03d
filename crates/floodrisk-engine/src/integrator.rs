//! Per-cell risk integration.
//!
//! The expected annual loss of a cell is the area under its loss-frequency
//! curve, approximated with trapezoids between consecutive events in the
//! order the events were supplied:
//!
//! ```text
//! risk = sum_i (loss[i] + loss[i+1]) * |freq[i+1] - freq[i]| / 2
//! ```

use floodrisk_core::{CoreError, CurvePoint, Frequency};
use floodrisk_math::integration::{fold_trapezoids, trapezoid_area, trapezoid_widths};

use crate::error::EngineResult;

/// The fixed abscissae of every cell's loss-frequency curve.
///
/// Frequencies are shared by all cells, so the trapezoid widths are
/// computed once and the per-cell work is a short multiply-add over the
/// loss samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskCurve {
    frequencies: Vec<Frequency>,
    widths: Vec<f64>,
}

impl RiskCurve {
    /// Builds a curve over `frequencies` in the given order.
    ///
    /// # Errors
    ///
    /// `InsufficientData` if fewer than two frequencies are supplied.
    pub fn new(frequencies: Vec<Frequency>) -> EngineResult<Self> {
        if frequencies.len() < 2 {
            return Err(CoreError::insufficient_data(2, frequencies.len()).into());
        }
        let xs: Vec<f64> = frequencies.iter().map(|f| f.value()).collect();
        let widths = trapezoid_widths(&xs)?;
        Ok(Self {
            frequencies,
            widths,
        })
    }

    /// Number of curve points.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Always false; a curve has at least two points.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Curve abscissae.
    pub fn frequencies(&self) -> &[Frequency] {
        &self.frequencies
    }

    /// Risk for one cell from its losses, one per frequency.
    ///
    /// `losses.len()` must equal [`RiskCurve::len`]; the engine guarantees
    /// this by construction. NaN and infinite losses propagate.
    #[inline]
    pub fn integrate(&self, losses: &[f64]) -> f64 {
        debug_assert_eq!(losses.len(), self.frequencies.len());
        fold_trapezoids(&self.widths, losses)
    }

    /// Checked variant of [`RiskCurve::integrate`].
    pub fn try_integrate(&self, losses: &[f64]) -> EngineResult<f64> {
        if losses.len() != self.frequencies.len() {
            return Err(CoreError::invalid_parameter(
                "losses",
                format!(
                    "expected {} loss samples, got {}",
                    self.frequencies.len(),
                    losses.len()
                ),
            )
            .into());
        }
        Ok(self.integrate(losses))
    }

    /// Pairs the curve's frequencies with `losses`.
    pub fn points(&self, losses: &[f64]) -> Vec<CurvePoint> {
        self.frequencies
            .iter()
            .zip(losses)
            .map(|(&frequency, &loss)| CurvePoint::new(frequency, loss))
            .collect()
    }
}

/// Risk for an explicit sequence of curve points.
pub fn integrate_points(points: &[CurvePoint]) -> EngineResult<f64> {
    let xy: Vec<(f64, f64)> = points.iter().map(CurvePoint::as_xy).collect();
    Ok(trapezoid_area(&xy)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::frequencies;
    use approx::assert_relative_eq;

    fn reference_curve() -> RiskCurve {
        RiskCurve::new(frequencies(&[2, 10, 50, 100]).unwrap()).unwrap()
    }

    #[test]
    fn test_reference_cell() {
        let curve = reference_curve();
        assert_relative_eq!(curve.integrate(&[100.0, 200.0, 300.0, 400.0]), 83.5, epsilon = 1e-10);
    }

    #[test]
    fn test_matches_closed_form_for_four_points() {
        let curve = reference_curve();
        let f: Vec<f64> = curve.frequencies().iter().map(|f| f.value()).collect();
        let l = [17.0, 0.0, 1234.5, 9.75];
        let expected = ((l[0] + l[1]) * (f[1] - f[0]).abs()
            + (l[1] + l[2]) * (f[2] - f[1]).abs()
            + (l[2] + l[3]) * (f[3] - f[2]).abs())
            / 2.0;
        assert_eq!(curve.integrate(&l), expected);
    }

    #[test]
    fn test_zero_losses() {
        assert_eq!(reference_curve().integrate(&[0.0; 4]), 0.0);
    }

    #[test]
    fn test_flat_losses_are_not_zero() {
        let risk = reference_curve().integrate(&[10.0; 4]);
        assert_relative_eq!(risk, 20.0 * (0.4 + 0.08 + 0.01) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_two_point_curve() {
        let curve = RiskCurve::new(frequencies(&[10, 100]).unwrap()).unwrap();
        assert_relative_eq!(curve.integrate(&[1.0, 3.0]), 4.0 * 0.09 / 2.0, epsilon = 1e-15);
    }

    #[test]
    fn test_generalises_beyond_four() {
        let aris = [1, 2, 5, 10, 20, 50, 100, 200];
        let curve = RiskCurve::new(frequencies(&aris).unwrap()).unwrap();
        let losses = [0.0, 5.0, 10.0, 20.0, 40.0, 80.0, 160.0, 320.0];
        let points = curve.points(&losses);
        assert_eq!(points.len(), 8);
        assert_eq!(curve.integrate(&losses), integrate_points(&points).unwrap());
    }

    #[test]
    fn test_single_frequency_rejected() {
        let err = RiskCurve::new(frequencies(&[100]).unwrap()).unwrap_err();
        assert_eq!(err.kind(), "InsufficientData");
    }

    #[test]
    fn test_try_integrate_length_check() {
        let curve = reference_curve();
        assert!(curve.try_integrate(&[1.0, 2.0]).is_err());
        assert_relative_eq!(
            curve.try_integrate(&[100.0, 200.0, 300.0, 400.0]).unwrap(),
            83.5,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_nan_loss_propagates() {
        assert!(reference_curve().integrate(&[1.0, f64::NAN, 1.0, 1.0]).is_nan());
    }
}
