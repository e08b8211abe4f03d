//! # Floodrisk Engine
//!
//! Per-cell expected annual loss integration over a stack of co-registered
//! event loss grids.
//!
//! This crate provides:
//! - [`frequencies`]: return periods to annual frequencies, validated up front
//! - [`GridZip`]: lock-step row-major cursor over N inputs and one output
//! - [`RiskCurve`]: trapezoidal risk for one cell
//! - [`RiskAggregator`]: writes each cell and keeps the grid-wide total
//! - [`RiskEngine`]: one pass, sequential or sharded by row bands
//!
//! ## Architecture
//!
//! ```text
//! return periods ─> frequencies ─> RiskCurve ─┐
//!                                             │
//! loss grids ──────> GridZip ─── losses ──────┴─> risk ─> RiskAggregator ─┬─> output grid
//!                                                                         └─> RiskSummary
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use floodrisk_core::{Grid, ReturnPeriod};
//! use floodrisk_engine::{LossEvent, RiskEngine};
//!
//! let engine = RiskEngine::builder()
//!     .with_event(LossEvent::new(ReturnPeriod::new(2).unwrap(), Grid::new(2, 2, 100.0)))
//!     .with_event(LossEvent::new(ReturnPeriod::new(10).unwrap(), Grid::new(2, 2, 200.0)))
//!     .with_event(LossEvent::new(ReturnPeriod::new(50).unwrap(), Grid::new(2, 2, 300.0)))
//!     .with_event(LossEvent::new(ReturnPeriod::new(100).unwrap(), Grid::new(2, 2, 400.0)))
//!     .build()
//!     .unwrap();
//!
//! let (risk, summary) = engine.compute(0.0).unwrap();
//! assert!((risk.get(0, 0).unwrap() - 83.5).abs() < 1e-10);
//! assert!((summary.net_risk.value() - 334.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod integrator;
pub mod observer;
pub mod zip;

// Re-exports
pub use aggregator::{RiskAggregator, RiskSummary};
pub use engine::{RiskEngine, RiskEngineBuilder};
pub use error::{EngineError, EngineResult};
pub use frequency::{frequencies, return_periods, LossEvent};
pub use integrator::{integrate_points, RiskCurve};
pub use observer::{NoopObserver, PassObserver};
pub use zip::{check_alignment, GridZip, ZipCell};
