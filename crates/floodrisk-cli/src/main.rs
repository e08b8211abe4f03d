//! Floodrisk CLI - expected annual loss from flood event loss rasters.
//!
//! # Usage
//!
//! ```bash
//! # Four events, paired by position
//! floodrisk run -m loss_2.tif -a 2 -m loss_10.tif -a 10 \
//!               -m loss_50.tif -a 50 -m loss_100.tif -a 100 \
//!               -r risk.tif -o total.txt
//!
//! # Same run from a TOML run file, sharded across 8 threads
//! floodrisk run --config run.toml --threads 8
//!
//! # Validate inputs only
//! floodrisk check --config run.toml
//! ```

use std::process::ExitCode;

use clap::Parser;
use floodrisk_config::ConfigError;
use floodrisk_engine::EngineError;
use floodrisk_raster::RasterError;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;
mod output;
mod report;

use cli::{Cli, Commands};
use error::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let format = cli.format;
    let quiet = cli.quiet;
    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, format, quiet),
        Commands::Check(args) => commands::check::execute(args, format, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{}: {err:#}", error_kind(&err)));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "floodrisk=debug,floodrisk_engine=debug,floodrisk_raster=debug,info",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn error_kind(err: &anyhow::Error) -> &'static str {
    if let Some(err) = err.downcast_ref::<CliError>() {
        err.kind()
    } else if let Some(err) = err.downcast_ref::<EngineError>() {
        err.kind()
    } else if err.downcast_ref::<RasterError>().is_some() {
        "IOFailure"
    } else if err.downcast_ref::<ConfigError>().is_some() {
        "InvalidParameter"
    } else {
        "Error"
    }
}
