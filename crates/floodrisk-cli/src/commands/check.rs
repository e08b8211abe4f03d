//! Check command implementation.
//!
//! Runs every validation a `run` would (return periods, existence, formats,
//! dimensions) without integrating or writing anything.

use anyhow::Result;
use clap::Args;
use floodrisk_engine::{LossEvent, RiskEngine};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::commands::{check_inputs_exist, open_event_rasters, validate_run, InputArgs};
use crate::output::{print_output, print_success};

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// One validated event.
#[derive(Debug, Serialize, Tabled)]
pub struct EventRow {
    #[tabled(rename = "Raster")]
    pub path: String,
    #[tabled(rename = "ARI")]
    pub ari: String,
    #[tabled(rename = "Frequency")]
    pub frequency: f64,
    #[tabled(rename = "Rows")]
    pub rows: usize,
    #[tabled(rename = "Cols")]
    pub cols: usize,
    #[tabled(rename = "No-data")]
    pub nodata: String,
}

/// Execute the check command.
pub fn execute(args: CheckArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let config = args.inputs.to_run_config()?;
    let periods = validate_run(&config)?;
    check_inputs_exist(&config)?;
    let rasters = open_event_rasters(&config)?;

    let engine = RiskEngine::builder()
        .with_events(periods.into_iter().zip(rasters).map(|(ari, raster)| LossEvent::new(ari, raster)))
        .build()?;

    let rows: Vec<EventRow> = engine
        .events()
        .iter()
        .map(|event| {
            let (rows, cols) = event.source().shape();
            EventRow {
                path: event.name().to_string(),
                ari: event.return_period().to_string(),
                frequency: event.frequency().value(),
                rows,
                cols,
                nodata: event
                    .source()
                    .nodata()
                    .map_or_else(|| "-".to_string(), |v| v.to_string()),
            }
        })
        .collect();

    print_output(&rows, format)?;
    if !quiet && format == OutputFormat::Table {
        print_success(&format!("{} event rasters are consistent", rows.len()));
    }
    Ok(())
}
