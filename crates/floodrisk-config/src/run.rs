//! Run configuration.
//!
//! A run file lists the event loss grids with their return periods, where
//! to write the risk raster and the report, and how to schedule the pass:
//!
//! ```toml
//! [[events]]
//! path = "loss_2.tif"
//! ari = 2
//!
//! [[events]]
//! path = "loss_100.tif"
//! ari = 100
//!
//! [output]
//! raster = "risk.tif"
//! report = "total.txt"
//! nodata = 0.0
//!
//! [engine]
//! parallel = true
//! threads = 4
//! ```
//!
//! Relative paths in a run file are resolved against the file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Default risk raster path.
pub const DEFAULT_RASTER: &str = "out-risk-raster.tif";

/// Default report path.
pub const DEFAULT_REPORT: &str = "loss-by-class-list.txt";

/// Default output no-data value.
pub const DEFAULT_NODATA: f64 = 0.0;

/// One event loss grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Path of the loss raster.
    pub path: PathBuf,
    /// Return period in years. Kept signed so bad values reach validation.
    pub ari: i64,
}

impl EventConfig {
    /// Creates an event entry.
    pub fn new(path: impl Into<PathBuf>, ari: i64) -> Self {
        Self {
            path: path.into(),
            ari,
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Risk raster path.
    #[serde(default = "default_raster")]
    pub raster: PathBuf,

    /// Report path.
    #[serde(default = "default_report")]
    pub report: PathBuf,

    /// No-data value declared on the risk raster.
    #[serde(default = "default_nodata")]
    pub nodata: f64,
}

fn default_raster() -> PathBuf {
    PathBuf::from(DEFAULT_RASTER)
}

fn default_report() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT)
}

fn default_nodata() -> f64 {
    DEFAULT_NODATA
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raster: default_raster(),
            report: default_report(),
            nodata: default_nodata(),
        }
    }
}

/// Pass scheduling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Shard rows across worker threads.
    #[serde(default)]
    pub parallel: bool,

    /// Worker thread count; implies `parallel`.
    pub threads: Option<usize>,

    /// Reject event grids whose georeference differs instead of warning.
    #[serde(default)]
    pub strict_georeference: bool,
}

/// A complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Event grids in integration order.
    pub events: Vec<EventConfig>,

    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,

    /// Pass scheduling.
    #[serde(default)]
    pub engine: EngineSettings,
}

impl RunConfig {
    /// Creates a run over `events` with default outputs and a sequential pass.
    pub fn new(events: Vec<EventConfig>) -> Self {
        Self {
            events,
            output: OutputConfig::default(),
            engine: EngineSettings::default(),
        }
    }

    /// Loads a run file, resolving relative paths against its directory.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        Ok(match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => config.resolve_paths(base),
            _ => config,
        })
    }

    /// Parses a run file's contents without touching the filesystem.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the run as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Makes every relative path absolute with respect to `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for event in &mut self.events {
            resolve(&mut event.path);
        }
        resolve(&mut self.output.raster);
        resolve(&mut self.output.report);
        self
    }

    /// Sets the output locations.
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    /// Sets the pass scheduling.
    pub fn with_engine(mut self, engine: EngineSettings) -> Self {
        self.engine = engine;
        self
    }

    /// Return periods in event order.
    pub fn return_periods(&self) -> Vec<i64> {
        self.events.iter().map(|e| e.ari).collect()
    }

    /// Event paths in event order.
    pub fn event_paths(&self) -> impl Iterator<Item = &Path> {
        self.events.iter().map(|e| e.path.as_path())
    }

    /// True if the pass should be sharded.
    pub fn is_parallel(&self) -> bool {
        self.engine.parallel || self.engine.threads.is_some()
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.events.len() < 2 {
            errors.push(ValidationError::with_rule(
                "events",
                format!("at least two events are required, got {}", self.events.len()),
                "min_events",
            ));
        }

        for (i, event) in self.events.iter().enumerate() {
            if event.path.as_os_str().is_empty() {
                errors.push(ValidationError::new(
                    format!("events[{i}].path"),
                    "Path cannot be empty",
                ));
            }
            if event.ari <= 0 {
                errors.push(ValidationError::with_rule(
                    format!("events[{i}].ari"),
                    format!("return period must be positive, got {}", event.ari),
                    "positive",
                ));
            }
        }

        errors.extend(self.output.validate());

        if self.engine.threads == Some(0) {
            errors.push(ValidationError::with_rule(
                "engine.threads",
                "thread count must be positive",
                "positive",
            ));
        }

        errors
    }
}

impl Validate for OutputConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.raster.as_os_str().is_empty() {
            errors.push(ValidationError::new("output.raster", "Path cannot be empty"));
        }
        if self.report.as_os_str().is_empty() {
            errors.push(ValidationError::new("output.report", "Path cannot be empty"));
        }
        if !self.raster.as_os_str().is_empty() && self.raster == self.report {
            errors.push(ValidationError::new(
                "output.report",
                "report and raster cannot share a path",
            ));
        }

        errors
    }
}
