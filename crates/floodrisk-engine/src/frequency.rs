//! Frequency setup and loss events.

use std::fmt;

use floodrisk_core::{CoreError, Frequency, GridSource, ReturnPeriod};

use crate::error::{EngineError, EngineResult};

/// Converts raw return periods into annual frequencies.
///
/// Runs before any grid is touched. The first non-positive value aborts
/// with `InvalidParameter` naming its position.
///
/// # Example
///
/// ```rust
/// use floodrisk_engine::frequencies;
///
/// let freqs = frequencies(&[2, 10, 50, 100]).unwrap();
/// let values: Vec<f64> = freqs.iter().map(|f| f.value()).collect();
/// assert_eq!(values, vec![0.5, 0.1, 0.02, 0.01]);
///
/// assert!(frequencies(&[2, 0, 50]).is_err());
/// ```
pub fn frequencies(raw: &[i64]) -> EngineResult<Vec<Frequency>> {
    Ok(return_periods(raw)?
        .into_iter()
        .map(ReturnPeriod::frequency)
        .collect())
}

/// Validates raw return periods.
pub fn return_periods(raw: &[i64]) -> EngineResult<Vec<ReturnPeriod>> {
    raw.iter()
        .enumerate()
        .map(|(i, &years)| {
            ReturnPeriod::new(years).map_err(|_| {
                EngineError::from(CoreError::invalid_parameter(
                    format!("return_period[{i}]"),
                    format!("return period must be a positive number of years, got {years}"),
                ))
            })
        })
        .collect()
}

/// One flood event: a loss grid and the return period it represents.
pub struct LossEvent {
    return_period: ReturnPeriod,
    source: Box<dyn GridSource<f64>>,
}

impl LossEvent {
    /// Pairs a loss grid with its return period.
    pub fn new(return_period: ReturnPeriod, source: impl GridSource<f64> + 'static) -> Self {
        Self {
            return_period,
            source: Box::new(source),
        }
    }

    /// Return period of the event.
    pub fn return_period(&self) -> ReturnPeriod {
        self.return_period
    }

    /// Annual frequency of the event.
    pub fn frequency(&self) -> Frequency {
        self.return_period.frequency()
    }

    /// Loss grid.
    pub fn source(&self) -> &dyn GridSource<f64> {
        self.source.as_ref()
    }

    /// Name of the loss grid.
    pub fn name(&self) -> &str {
        self.source.label()
    }
}

impl fmt::Debug for LossEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LossEvent")
            .field("return_period", &self.return_period)
            .field("source", &self.source.label())
            .field("shape", &self.source.shape())
            .finish()
    }
}
