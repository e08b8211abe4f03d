//! CLI command implementations.

pub mod check;
pub mod run;

pub use check::CheckArgs;
pub use run::RunArgs;

use std::path::PathBuf;

use clap::Args;
use floodrisk_config::{EventConfig, RunConfig, Validate};
use floodrisk_core::ReturnPeriod;
use floodrisk_engine::return_periods;
use floodrisk_raster::{open_raster, RasterFile};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Event inputs shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Event loss raster; repeat once per event, paired with --ari by position
    #[arg(short = 'm', long = "map", value_name = "PATH", conflicts_with = "config")]
    pub maps: Vec<PathBuf>,

    /// The X of a 1-in-X-year event; repeat once per --map, in the same order
    #[arg(
        short = 'a',
        long = "ari",
        value_name = "X",
        allow_negative_numbers = true,
        conflicts_with = "config"
    )]
    pub aris: Vec<i64>,

    /// TOML run file listing events, outputs and engine settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl InputArgs {
    /// Builds the run from a run file or from the repeated flags.
    pub fn to_run_config(&self) -> CliResult<RunConfig> {
        if let Some(path) = &self.config {
            debug!(path = %path.display(), "loading run file");
            return Ok(RunConfig::from_file(path)?);
        }
        if self.maps.len() != self.aris.len() {
            return Err(CliError::Usage(format!(
                "every --map needs a matching --ari: got {} maps and {} return periods",
                self.maps.len(),
                self.aris.len()
            )));
        }
        let events = self
            .maps
            .iter()
            .zip(&self.aris)
            .map(|(path, &ari)| EventConfig::new(path.clone(), ari))
            .collect();
        Ok(RunConfig::new(events))
    }
}

/// Validates a run and returns its return periods.
///
/// Nothing on disk is touched.
pub fn validate_run(config: &RunConfig) -> CliResult<Vec<ReturnPeriod>> {
    config.validate_or_error()?;
    Ok(return_periods(&config.return_periods())?)
}

/// Fails on the first event raster that does not exist.
pub fn check_inputs_exist(config: &RunConfig) -> CliResult<()> {
    for path in config.event_paths() {
        if !path.exists() {
            return Err(CliError::MissingInput(path.display().to_string()));
        }
    }
    Ok(())
}

/// Opens every event raster in event order.
pub fn open_event_rasters(config: &RunConfig) -> CliResult<Vec<RasterFile>> {
    config
        .event_paths()
        .map(|path| open_raster(path).map_err(CliError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(maps: &[&str], aris: &[i64]) -> InputArgs {
        InputArgs {
            maps: maps.iter().map(PathBuf::from).collect(),
            aris: aris.to_vec(),
            config: None,
        }
    }

    #[test]
    fn test_flags_pair_by_position() {
        let run = inputs(&["a.tif", "b.tif"], &[10, 100]).to_run_config().unwrap();
        assert_eq!(run.events[1], EventConfig::new("b.tif", 100));
    }

    #[test]
    fn test_unpaired_flags_rejected() {
        let err = inputs(&["a.tif", "b.tif"], &[10]).to_run_config().unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn test_validation_precedes_existence() {
        let run = inputs(&["nowhere.tif", "nowhere2.tif"], &[10, 0])
            .to_run_config()
            .unwrap();
        let err = validate_run(&run).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");
        assert!(err.to_string().contains("events[1].ari"));
    }

    #[test]
    fn test_missing_input_named() {
        let run = inputs(&["definitely-missing-1.tif", "x.tif"], &[10, 100])
            .to_run_config()
            .unwrap();
        let err = check_inputs_exist(&run).unwrap_err();
        assert_eq!(err.to_string(), "definitely-missing-1.tif does not exist");
    }
}
