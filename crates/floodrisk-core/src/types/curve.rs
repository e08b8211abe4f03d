//! Points on a loss-frequency curve.

use serde::{Deserialize, Serialize};

use super::Frequency;

/// One sample of a cell's loss-frequency curve.
///
/// A cell's curve is the sequence of points in the order the event grids
/// were supplied. Points are never re-sorted by frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Annual frequency of the event.
    pub frequency: Frequency,
    /// Loss at the cell for that event.
    pub loss: f64,
}

impl CurvePoint {
    /// Creates a new curve point.
    #[must_use]
    pub fn new(frequency: Frequency, loss: f64) -> Self {
        Self { frequency, loss }
    }

    /// Returns the point as an `(x, y)` pair.
    #[must_use]
    pub fn as_xy(&self) -> (f64, f64) {
        (self.frequency.value(), self.loss)
    }
}
