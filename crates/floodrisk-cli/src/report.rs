//! The net risk report.
//!
//! A single labelled line, `total_risk<TAB><value>`, written atomically.

use std::io::Write;
use std::path::Path;

use floodrisk_core::NetRisk;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{CliError, CliResult};

/// Label of the report line.
pub const TOTAL_RISK_KEY: &str = "total_risk";

/// Renders the report body.
pub fn render_report(net_risk: NetRisk) -> String {
    format!("{TOTAL_RISK_KEY}\t{net_risk}\n")
}

/// Writes the report to `path`, replacing any previous file.
pub fn write_report(path: &Path, net_risk: NetRisk) -> CliResult<()> {
    let output_error = |reason: String| CliError::Output {
        path: path.display().to_string(),
        reason,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| output_error(e.to_string()))?;
    tmp.write_all(render_report(net_risk).as_bytes())
        .and_then(|()| tmp.flush())
        .map_err(|e| output_error(e.to_string()))?;
    tmp.persist(path).map_err(|e| output_error(e.error.to_string()))?;

    info!(path = %path.display(), net_risk = net_risk.value(), "wrote report");
    Ok(())
}
