//! Return period and annual frequency types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Annual recurrence interval: the `X` in a "1-in-X-year" event.
///
/// Always strictly positive. Construction from a raw integer is fallible so
/// that a zero or negative ARI never reaches the `1 / X` division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct ReturnPeriod(u32);

impl ReturnPeriod {
    /// Creates a return period, rejecting non-positive values.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidParameter` if `years <= 0` or does not fit in a `u32`.
    pub fn new(years: i64) -> CoreResult<Self> {
        if years <= 0 {
            return Err(CoreError::invalid_parameter(
                "return_period",
                format!("return period must be positive, got {years}"),
            ));
        }
        let years = u32::try_from(years).map_err(|_| {
            CoreError::invalid_parameter(
                "return_period",
                format!("return period {years} exceeds {}", u32::MAX),
            )
        })?;
        Ok(Self(years))
    }

    /// Returns the number of years between events.
    #[must_use]
    pub fn years(self) -> u32 {
        self.0
    }

    /// Returns the annual frequency `1 / years`.
    #[must_use]
    pub fn frequency(self) -> Frequency {
        Frequency::from_return_period(self)
    }
}

impl TryFrom<i64> for ReturnPeriod {
    type Error = CoreError;

    fn try_from(value: i64) -> CoreResult<Self> {
        Self::new(value)
    }
}

impl From<ReturnPeriod> for u32 {
    fn from(value: ReturnPeriod) -> Self {
        value.0
    }
}

impl fmt::Display for ReturnPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1-in-{}", self.0)
    }
}

/// Annual probability of occurrence of an event.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Frequency(f64);

impl Frequency {
    /// Derives the frequency of a return period.
    #[must_use]
    pub fn from_return_period(ari: ReturnPeriod) -> Self {
        Self(1.0 / f64::from(ari.years()))
    }

    /// Wraps a raw frequency without validation.
    ///
    /// Intended for integrating curves whose abscissae were produced
    /// elsewhere; the caller is responsible for the value being meaningful.
    #[must_use]
    pub fn new_unchecked(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw probability.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<ReturnPeriod> for Frequency {
    fn from(ari: ReturnPeriod) -> Self {
        Self::from_return_period(ari)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequency_from_ari() {
        let cases = [(2, 0.5), (10, 0.1), (50, 0.02), (100, 0.01)];
        for (years, expected) in cases {
            let ari = ReturnPeriod::new(years).unwrap();
            assert_relative_eq!(ari.frequency().value(), expected, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_zero_rejected() {
        let err = ReturnPeriod::new(0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidParameter { .. }));
    }

    #[test]
    fn test_negative_rejected() {
        let err = ReturnPeriod::new(-5).unwrap_err();
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_too_large_rejected() {
        assert!(ReturnPeriod::new(i64::from(u32::MAX) + 1).is_err());
        assert!(ReturnPeriod::new(i64::from(u32::MAX)).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(ReturnPeriod::new(100).unwrap().to_string(), "1-in-100");
    }

    #[test]
    fn test_serde_validates() {
        let ari: ReturnPeriod = serde_json::from_str("50").unwrap();
        assert_eq!(ari.years(), 50);
        assert!(serde_json::from_str::<ReturnPeriod>("0").is_err());
        assert_eq!(serde_json::to_string(&ari).unwrap(), "50");
    }
}
