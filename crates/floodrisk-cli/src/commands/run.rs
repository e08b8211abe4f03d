//! Run command implementation.
//!
//! Integrates the event loss rasters, commits the risk raster, then writes
//! the net risk report.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use floodrisk_config::RunConfig;
use floodrisk_engine::{LossEvent, PassObserver, RiskEngine, RiskSummary};
use floodrisk_raster::create_raster_from_model;
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::commands::{check_inputs_exist, open_event_rasters, validate_run, InputArgs};
use crate::output::{print_header, print_record, print_success, print_warning, KeyValue};
use crate::report::write_report;

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Path of the output risk raster (.tif, .tiff, .asc)
    #[arg(short = 'r', long, value_name = "PATH")]
    pub out_raster: Option<PathBuf>,

    /// Path of the text report holding the net risk
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out_list: Option<PathBuf>,

    /// No-data value declared on the risk raster
    #[arg(long, allow_negative_numbers = true)]
    pub nodata: Option<f64>,

    /// Shard rows across all cores
    #[arg(long)]
    pub parallel: bool,

    /// Shard rows across this many worker threads
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Fail when event rasters are georeferenced differently
    #[arg(long)]
    pub strict_georeference: bool,
}

impl RunArgs {
    /// Resolves the run, letting flags override the run file.
    pub fn to_run_config(&self) -> crate::error::CliResult<RunConfig> {
        let mut config = self.inputs.to_run_config()?;
        if let Some(path) = &self.out_raster {
            config.output.raster = path.clone();
        }
        if let Some(path) = &self.out_list {
            config.output.report = path.clone();
        }
        if let Some(nodata) = self.nodata {
            config.output.nodata = nodata;
        }
        if self.parallel {
            config.engine.parallel = true;
        }
        if self.threads.is_some() {
            config.engine.threads = self.threads;
        }
        if self.strict_georeference {
            config.engine.strict_georeference = true;
        }
        Ok(config)
    }
}

/// Outcome of a run.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    /// Sum of every cell's risk.
    pub total_risk: f64,
    /// Cells integrated.
    pub cells: usize,
    /// Raster rows.
    pub rows: usize,
    /// Raster columns.
    pub cols: usize,
    /// Event rasters.
    pub events: usize,
    /// Largest single-cell risk.
    pub max_cell_risk: Option<f64>,
    /// Cells whose risk equals the output no-data value.
    pub sentinel_cells: usize,
    /// Risk raster written.
    pub raster: PathBuf,
    /// Report written.
    pub report: PathBuf,
}

impl RunOutcome {
    fn new(summary: &RiskSummary, config: &RunConfig, raster: PathBuf) -> Self {
        Self {
            total_risk: summary.net_risk.value(),
            cells: summary.cells,
            rows: summary.rows,
            cols: summary.cols,
            events: summary.events,
            max_cell_risk: summary.max_cell_risk,
            sentinel_cells: summary.sentinel_cells,
            raster,
            report: config.output.report.clone(),
        }
    }

    fn rows(&self) -> Vec<KeyValue> {
        vec![
            KeyValue::new("Total risk", self.total_risk),
            KeyValue::new("Grid", format!("{} x {}", self.rows, self.cols)),
            KeyValue::new("Cells", self.cells),
            KeyValue::new("Events", self.events),
            KeyValue::optional("Max cell risk", self.max_cell_risk),
            KeyValue::new("Cells equal to no-data", self.sentinel_cells),
            KeyValue::new("Risk raster", self.raster.display()),
            KeyValue::new("Report", self.report.display()),
        ]
    }
}

/// Logs pass progress roughly every tenth of the grid.
#[derive(Debug, Default)]
struct LogProgress {
    rows: AtomicUsize,
}

impl PassObserver for LogProgress {
    fn on_start(&self, rows: usize, _cols: usize) {
        self.rows.store(rows, Ordering::Relaxed);
    }

    fn on_row(&self, done: usize) {
        let rows = self.rows.load(Ordering::Relaxed);
        let step = (rows / 10).max(1);
        if done % step == 0 || done == rows {
            debug!(done, rows, "rows integrated");
        }
    }
}

/// Execute the run command.
pub fn execute(args: RunArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let config = args.to_run_config()?;
    let periods = validate_run(&config)?;
    check_inputs_exist(&config)?;

    let rasters = open_event_rasters(&config)?;
    let mut output =
        create_raster_from_model(&config.output.raster, rasters[0].grid(), config.output.nodata)?;

    let mut builder = RiskEngine::builder()
        .with_events(periods.into_iter().zip(rasters).map(|(ari, raster)| LossEvent::new(ari, raster)))
        .with_parallel(config.engine.parallel)
        .with_strict_georeference(config.engine.strict_georeference)
        .with_observer(Arc::new(LogProgress::default()));
    if let Some(threads) = config.engine.threads {
        builder = builder.with_threads(threads);
    }
    let engine = builder.build()?;

    let summary = engine.run(output.grid_mut())?;
    let raster = output.commit()?;
    write_report(&config.output.report, summary.net_risk)?;
    info!(raster = %raster.display(), "run complete");

    let outcome = RunOutcome::new(&summary, &config, raster);
    if format == OutputFormat::Table && !quiet {
        print_header("Flood risk");
    }
    print_record(&outcome, &outcome.rows(), &summary.net_risk.to_string(), format)?;
    if !quiet && format == OutputFormat::Table {
        if summary.sentinel_cells > 0 {
            print_warning(&format!(
                "{} cells have risk equal to the no-data value {}",
                summary.sentinel_cells, config.output.nodata
            ));
        }
        print_success("risk raster and report written");
    }
    Ok(())
}
