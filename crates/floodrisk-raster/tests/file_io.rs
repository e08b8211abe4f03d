//! Integration tests for opening and committing raster files.

use std::fs;

use floodrisk_core::{GeoReference, Grid, GridSource};
use floodrisk_raster::{
    create_raster_from_model, open_raster, write_raster, RasterError, RasterFormat,
};

// =============================================================================
// TEST FIXTURES
// =============================================================================

const LOSS_ASC: &str = "\
ncols 2
nrows 2
xllcorner 300000
yllcorner 5800000
cellsize 5
NODATA_value -9999
100 200
300 -9999
";

fn write_fixture(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

// =============================================================================
// OPEN
// =============================================================================

#[test]
fn opens_ascii_grid_with_prj_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "loss_100.asc", LOSS_ASC);
    fs::write(dir.path().join("loss_100.prj"), "EPSG:28355\n").unwrap();

    let raster = open_raster(&path).unwrap();
    assert_eq!(raster.grid().shape(), (2, 2));
    assert_eq!(raster.grid().get(1, 0), Some(300.0));
    assert_eq!(raster.nodata(), Some(-9999.0));
    assert_eq!(raster.geo_reference().projection.as_deref(), Some("EPSG:28355"));
    assert_eq!(raster.label(), path.display().to_string());
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.asc");
    let err = open_raster(&path).unwrap_err();
    assert!(matches!(err, RasterError::NotFound { .. }));
    assert!(err.to_string().ends_with("does not exist"));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "loss.nc", "whatever");
    assert!(matches!(
        open_raster(&path),
        Err(RasterError::UnsupportedFormat { .. })
    ));
}

#[test]
fn format_detection_is_case_insensitive() {
    assert_eq!(
        RasterFormat::from_path("A.TIF".as_ref()).unwrap(),
        RasterFormat::GeoTiff
    );
    assert_eq!(
        RasterFormat::from_path("b.Asc".as_ref()).unwrap(),
        RasterFormat::AsciiGrid
    );
}

// =============================================================================
// CREATE FROM MODEL / COMMIT
// =============================================================================

#[test]
fn output_copies_model_georeference_and_declares_nodata() {
    let dir = tempfile::tempdir().unwrap();
    let input = open_raster(write_fixture(dir.path(), "in.asc", LOSS_ASC)).unwrap();

    let out = create_raster_from_model(dir.path().join("risk.tif"), input.grid(), 0.0).unwrap();
    assert_eq!(out.grid().shape(), input.grid().shape());
    assert_eq!(out.grid().geo(), input.grid().geo());
    assert_eq!(out.grid().nodata(), Some(0.0));
    assert!(out.grid().cells().all(|v| *v == 0.0));
}

#[test]
fn uncommitted_output_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let model = Grid::new(2, 2, 0.0);
    let target = dir.path().join("risk.tif");
    {
        let mut out = create_raster_from_model(&target, &model, 0.0).unwrap();
        out.grid_mut().set(0, 0, 12.0).unwrap();
    }
    assert!(!target.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn committed_geotiff_reopens_identically() {
    let dir = tempfile::tempdir().unwrap();
    let model = Grid::new(3, 2, 0.0)
        .with_geo(GeoReference::north_up(150.0, -33.0, 0.001).with_projection("EPSG:4326"));
    let target = dir.path().join("risk.tif");

    let mut out = create_raster_from_model(&target, &model, 0.0).unwrap();
    out.grid_mut().set(2, 1, 83.5).unwrap();
    let written = out.commit().unwrap();
    assert_eq!(written, target);

    let back = open_raster(&target).unwrap();
    assert_eq!(back.grid().get(2, 1), Some(83.5));
    assert_eq!(back.grid().nodata(), Some(0.0));
    assert_eq!(back.grid().geo(), model.geo());
}

#[test]
fn committed_ascii_grid_writes_prj() {
    let dir = tempfile::tempdir().unwrap();
    let grid = Grid::from_vec(1, 2, vec![1.25, 2.5])
        .unwrap()
        .with_geo(GeoReference::north_up(0.0, 10.0, 5.0).with_projection("EPSG:32755"))
        .with_nodata(Some(0.0));
    let target = dir.path().join("risk.asc");
    write_raster(&target, grid.clone()).unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join("risk.prj")).unwrap().trim(),
        "EPSG:32755"
    );
    let back = open_raster(&target).unwrap().into_grid();
    assert_eq!(back, grid);
}
