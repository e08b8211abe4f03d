//! Risk values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Expected annual loss of a single cell.
pub type RiskValue = f64;

/// Running grid-wide sum of [`RiskValue`]s.
///
/// Plain summation in the order values are added; no compensation.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetRisk(f64);

impl NetRisk {
    /// A total of zero.
    pub const ZERO: Self = Self(0.0);

    /// Wraps a raw total.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Adds one cell's risk.
    pub fn add_cell(&mut self, value: RiskValue) {
        self.0 += value;
    }

    /// Returns the raw total.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Add for NetRisk {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for NetRisk {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for NetRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
