//! Floodrisk Configuration Layer
//!
//! Run configuration for the Floodrisk expected annual loss tool: which
//! event loss grids to integrate and with which return periods, where the
//! risk raster and the report go, and how the pass is scheduled.
//!
//! # Example
//!
//! ```rust
//! use floodrisk_config::{EventConfig, RunConfig, Validate};
//!
//! let run = RunConfig::from_toml(r#"
//!     [[events]]
//!     path = "loss_10.tif"
//!     ari = 10
//!
//!     [[events]]
//!     path = "loss_100.tif"
//!     ari = 100
//! "#).unwrap();
//!
//! assert!(run.is_valid());
//! assert_eq!(run.return_periods(), vec![10, 100]);
//! assert_eq!(run.output.report.to_str(), Some("loss-by-class-list.txt"));
//!
//! let bad = RunConfig::new(vec![EventConfig::new("only.tif", 0)]);
//! assert_eq!(bad.validate().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod run;

pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use run::{
    EngineSettings, EventConfig, OutputConfig, RunConfig, DEFAULT_NODATA, DEFAULT_RASTER,
    DEFAULT_REPORT,
};
