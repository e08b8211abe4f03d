//! Risk aggregation.

use floodrisk_core::{NetRisk, RiskValue};
use serde::Serialize;

use crate::zip::ZipCell;

/// Accumulates per-cell risk into a grid-wide total.
///
/// Each pass (or each row band of a parallel pass) owns one aggregator;
/// bands are combined with [`RiskAggregator::merge`] after all of them
/// have finished.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAggregator {
    net_risk: NetRisk,
    cells: usize,
    max_cell_risk: Option<RiskValue>,
    sentinel: Option<f64>,
    sentinel_cells: usize,
}

impl RiskAggregator {
    /// Creates an empty aggregator for an output whose no-data value is `sentinel`.
    ///
    /// Without a sentinel no cell is counted as colliding with no-data.
    pub fn new(sentinel: Option<f64>) -> Self {
        Self {
            net_risk: NetRisk::ZERO,
            cells: 0,
            max_cell_risk: None,
            sentinel,
            sentinel_cells: 0,
        }
    }

    /// Writes `value` into the cell's output slot and adds it to the total.
    #[inline]
    pub fn record(&mut self, cell: ZipCell<'_>, value: RiskValue) {
        *cell.out = value;
        self.add(value);
    }

    /// Adds a value without writing it anywhere.
    #[inline]
    pub fn add(&mut self, value: RiskValue) {
        self.net_risk.add_cell(value);
        self.cells += 1;
        if self.sentinel == Some(value) {
            self.sentinel_cells += 1;
        }
        self.max_cell_risk = Some(match self.max_cell_risk {
            Some(max) => max.max(value),
            None => value,
        });
    }

    /// Folds another aggregator's counts into this one.
    pub fn merge(&mut self, other: Self) {
        self.net_risk += other.net_risk;
        self.cells += other.cells;
        self.sentinel_cells += other.sentinel_cells;
        self.max_cell_risk = match (self.max_cell_risk, other.max_cell_risk) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    /// Running total.
    pub fn net_risk(&self) -> NetRisk {
        self.net_risk
    }

    /// Cells recorded so far.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Seals the aggregator into a summary of a `rows x cols` pass over `events` grids.
    pub fn finish(self, rows: usize, cols: usize, events: usize) -> RiskSummary {
        RiskSummary {
            net_risk: self.net_risk,
            cells: self.cells,
            rows,
            cols,
            events,
            max_cell_risk: self.max_cell_risk,
            nodata: self.sentinel,
            sentinel_cells: self.sentinel_cells,
        }
    }
}

/// Result of one integration pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    /// Sum of every cell's risk.
    pub net_risk: NetRisk,
    /// Cells visited.
    pub cells: usize,
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
    /// Number of event grids integrated.
    pub events: usize,
    /// Largest single-cell risk, if any cell was visited.
    pub max_cell_risk: Option<RiskValue>,
    /// No-data value declared on the output.
    pub nodata: Option<f64>,
    /// Cells whose computed risk equals `nodata` and will read as no-data downstream.
    pub sentinel_cells: usize,
}

impl RiskSummary {
    /// Mean risk per cell.
    pub fn mean_cell_risk(&self) -> Option<f64> {
        (self.cells > 0).then(|| self.net_risk.value() / self.cells as f64)
    }
}
