//! Domain types for Floodrisk.

mod curve;
mod return_period;
mod risk;

pub use curve::CurvePoint;
pub use return_period::{Frequency, ReturnPeriod};
pub use risk::{NetRisk, RiskValue};
