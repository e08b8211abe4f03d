//! Integration tests for the `floodrisk` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ARIS: [i64; 4] = [2, 10, 50, 100];
const LOSSES: [f64; 4] = [100.0, 200.0, 300.0, 400.0];

fn write_asc(path: &Path, rows: usize, cols: usize, value: f64) {
    let mut body = format!(
        "ncols {cols}\nnrows {rows}\nxllcorner 320000\nyllcorner 5810000\ncellsize 10\nNODATA_value -9999\n"
    );
    for _ in 0..rows {
        let row: Vec<String> = (0..cols).map(|_| value.to_string()).collect();
        body.push_str(&row.join(" "));
        body.push('\n');
    }
    fs::write(path, body).unwrap();
}

/// Writes the four 2x2 reference event rasters and returns their paths.
fn reference_maps(dir: &Path) -> Vec<PathBuf> {
    ARIS.iter()
        .zip(LOSSES)
        .map(|(ari, loss)| {
            let path = dir.join(format!("loss_{ari}.asc"));
            write_asc(&path, 2, 2, loss);
            path
        })
        .collect()
}

fn floodrisk(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("floodrisk").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn event_args(cmd: &mut Command, maps: &[PathBuf], aris: &[i64]) {
    for (map, ari) in maps.iter().zip(aris) {
        cmd.arg("-m").arg(map).arg("-a").arg(ari.to_string());
    }
}

fn report_value(path: &Path) -> f64 {
    let report = fs::read_to_string(path).unwrap();
    let value = report
        .strip_prefix("total_risk\t")
        .and_then(|rest| rest.strip_suffix('\n'))
        .unwrap_or_else(|| panic!("malformed report: {report:?}"));
    value.parse().unwrap()
}

#[test]
fn test_run_writes_raster_and_report() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "-r", "risk.asc", "-o", "total.txt"]);
    event_args(&mut cmd, &maps, &ARIS);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total risk"));

    assert!((report_value(&dir.path().join("total.txt")) - 334.0).abs() < 1e-9);

    let raster = fs::read_to_string(dir.path().join("risk.asc")).unwrap();
    assert!(raster.to_ascii_lowercase().contains("nrows"));
    assert!(raster.contains("83.5"));
}

#[test]
fn test_run_defaults_output_names() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "-q"]);
    event_args(&mut cmd, &maps, &ARIS);
    cmd.assert().success();

    assert!(dir.path().join("out-risk-raster.tif").exists());
    assert!(dir.path().join("loss-by-class-list.txt").exists());
}

#[test]
fn test_minimal_format_prints_total() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "--format", "minimal", "-r", "risk.asc", "-o", "total.txt"]);
    event_args(&mut cmd, &maps, &ARIS);
    let output = cmd.assert().success().get_output().stdout.clone();

    let total: f64 = String::from_utf8(output).unwrap().trim().parse().unwrap();
    assert!((total - 334.0).abs() < 1e-9);
}

#[test]
fn test_json_format_reports_summary() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "-f", "json", "--parallel", "-r", "risk.tif", "-o", "total.txt"]);
    event_args(&mut cmd, &maps, &ARIS);
    let output = cmd.assert().success().get_output().stdout.clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["cells"], 4);
    assert_eq!(json["events"], 4);
    assert!((json["total_risk"].as_f64().unwrap() - 334.0).abs() < 1e-9);
}

#[test]
fn test_missing_map_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let mut maps = reference_maps(dir.path());
    maps[2] = dir.path().join("loss_50_missing.asc");

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "-r", "risk.asc", "-o", "total.txt"]);
    event_args(&mut cmd, &maps, &ARIS);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("IOFailure"))
        .stderr(predicate::str::contains("loss_50_missing.asc does not exist"));

    assert!(!dir.path().join("risk.asc").exists());
    assert!(!dir.path().join("total.txt").exists());
}

#[test]
fn test_non_positive_ari_rejected() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "-r", "risk.asc", "-o", "total.txt"]);
    event_args(&mut cmd, &maps, &[2, 10, 0, 100]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("InvalidParameter"));

    assert!(!dir.path().join("risk.asc").exists());
}

#[test]
fn test_negative_ari_parsed_then_rejected() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.arg("check");
    event_args(&mut cmd, &maps, &[2, -10, 50, 100]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("InvalidParameter"));
}

#[test]
fn test_mismatched_dimensions_rejected() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());
    write_asc(&maps[3], 2, 3, 400.0);

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "-r", "risk.asc", "-o", "total.txt"]);
    event_args(&mut cmd, &maps, &ARIS);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DimensionMismatch"))
        .stderr(predicate::str::contains("loss_100.asc"));

    assert!(!dir.path().join("risk.asc").exists());
    assert!(!dir.path().join("total.txt").exists());
}

#[test]
fn test_strict_georeference_rejects_shifted_map() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());
    let shifted = fs::read_to_string(&maps[1])
        .unwrap()
        .replace("xllcorner 320000", "xllcorner 320010");
    fs::write(&maps[1], shifted).unwrap();

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "-q", "-r", "lenient.asc", "-o", "lenient.txt"]);
    event_args(&mut cmd, &maps, &ARIS);
    cmd.assert().success();

    let mut cmd = floodrisk(&dir);
    cmd.args(["run", "--strict-georeference", "-r", "risk.asc", "-o", "total.txt"]);
    event_args(&mut cmd, &maps, &ARIS);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DimensionMismatch"))
        .stderr(predicate::str::contains("loss_10.asc"));

    assert!(!dir.path().join("risk.asc").exists());
}

#[test]
fn test_unpaired_flags_rejected() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.arg("run");
    event_args(&mut cmd, &maps, &ARIS);
    cmd.args(["-m", "extra.asc"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("matching --ari"));
}

#[test]
fn test_check_lists_events() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.arg("check");
    event_args(&mut cmd, &maps, &ARIS);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("loss_100.asc"))
        .stdout(predicate::str::contains("0.02"))
        .stdout(predicate::str::contains("4 event rasters are consistent"));

    assert!(!dir.path().join("out-risk-raster.tif").exists());
}

#[test]
fn test_run_from_config_file() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("inputs");
    fs::create_dir(&inputs).unwrap();
    reference_maps(&inputs);

    let run_file = inputs.join("run.toml");
    fs::write(
        &run_file,
        r#"
[[events]]
path = "loss_2.asc"
ari = 2

[[events]]
path = "loss_10.asc"
ari = 10

[[events]]
path = "loss_50.asc"
ari = 50

[[events]]
path = "loss_100.asc"
ari = 100

[output]
raster = "risk.asc"
report = "total.txt"

[engine]
threads = 2
"#,
    )
    .unwrap();

    floodrisk(&dir)
        .args(["run", "-q", "--config"])
        .arg(&run_file)
        .assert()
        .success();

    assert!(inputs.join("risk.asc").exists());
    assert!((report_value(&inputs.join("total.txt")) - 334.0).abs() < 1e-9);
}

#[test]
fn test_config_conflicts_with_maps() {
    let dir = TempDir::new().unwrap();
    let maps = reference_maps(dir.path());

    let mut cmd = floodrisk(&dir);
    cmd.args(["check", "--config", "run.toml"]);
    event_args(&mut cmd, &maps[..1], &ARIS[..1]);
    cmd.assert().failure();
}
