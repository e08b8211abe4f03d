//! # Floodrisk Raster
//!
//! File-based raster input and output for the Floodrisk risk engine.
//!
//! This crate is the I/O collaborator of the engine:
//! - open georeferenced loss grids ([`open_raster`])
//! - create an output grid "from a model" that copies shape and georeference
//!   ([`create_raster_from_model`])
//! - commit that output atomically once the pass has succeeded
//!
//! Supported formats, chosen by file extension:
//! - ESRI ASCII grid (`.asc`, `.grd`), with optional `.prj` sidecar
//! - single-band GeoTIFF (`.tif`, `.tiff`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ascii;
mod error;
pub mod geotiff;
mod output;

pub use error::{RasterError, RasterResult};
pub use output::OutputRaster;

use std::fmt;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use floodrisk_core::{CoreResult, GeoReference, Grid, GridShape, GridSource};
use tracing::{debug, info};

/// On-disk raster encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    /// ESRI ASCII grid.
    AsciiGrid,
    /// Single-band GeoTIFF.
    GeoTiff,
}

impl RasterFormat {
    /// Detects the format from a path's extension.
    pub fn from_path(path: &Path) -> RasterResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("asc" | "grd") => Ok(Self::AsciiGrid),
            Some("tif" | "tiff") => Ok(Self::GeoTiff),
            _ => Err(RasterError::UnsupportedFormat {
                path: path.display().to_string(),
                reason: "expected a .asc, .grd, .tif or .tiff extension".into(),
            }),
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsciiGrid => write!(f, "ESRI ASCII grid"),
            Self::GeoTiff => write!(f, "GeoTIFF"),
        }
    }
}

/// A grid loaded from disk, remembering where it came from.
#[derive(Debug, Clone)]
pub struct RasterFile {
    path: PathBuf,
    label: String,
    grid: Grid<f64>,
}

impl RasterFile {
    /// Wraps an in-memory grid under a path label.
    pub fn new(path: impl Into<PathBuf>, grid: Grid<f64>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label, grid }
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loaded samples.
    pub fn grid(&self) -> &Grid<f64> {
        &self.grid
    }

    /// Consumes the file and returns the grid.
    pub fn into_grid(self) -> Grid<f64> {
        self.grid
    }
}

impl GridShape for RasterFile {
    fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }
}

impl GridSource<f64> for RasterFile {
    fn geo_reference(&self) -> &GeoReference {
        self.grid.geo()
    }

    fn nodata(&self) -> Option<f64> {
        self.grid.nodata()
    }

    fn read(&self, row: usize, col: usize) -> CoreResult<f64> {
        GridSource::read(&self.grid, row, col)
    }

    fn read_row(&self, row: usize, buf: &mut [f64]) -> CoreResult<()> {
        self.grid.read_row(row, buf)
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Opens a raster file as a `Grid<f64>`.
///
/// # Errors
///
/// `NotFound` if the path does not exist, `UnsupportedFormat` for unknown
/// extensions, and parse/codec errors for malformed content.
pub fn open_raster(path: impl AsRef<Path>) -> RasterResult<RasterFile> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RasterError::NotFound {
            path: path.display().to_string(),
        });
    }
    let format = RasterFormat::from_path(path)?;
    let label = path.display().to_string();
    let file = output::open_file(path)?;

    let grid = match format {
        RasterFormat::AsciiGrid => {
            let mut grid = ascii::read_ascii_grid(BufReader::new(file), &label)?;
            grid.geo_mut().projection = output::read_prj_sidecar(path)?;
            grid
        }
        RasterFormat::GeoTiff => geotiff::read_geotiff(BufReader::new(file), &label)?,
    };

    info!(
        path = %label,
        %format,
        rows = grid.rows(),
        cols = grid.cols(),
        nodata = ?grid.nodata(),
        "opened raster"
    );
    Ok(RasterFile::new(path, grid))
}

/// Creates an output raster shaped and georeferenced like `model`.
///
/// Every cell starts at `nodata`, which is also declared as the output's
/// no-data sentinel.
pub fn create_raster_from_model(
    path: impl AsRef<Path>,
    model: &Grid<f64>,
    nodata: f64,
) -> RasterResult<OutputRaster> {
    let grid = Grid::from_model(model, nodata).with_nodata(Some(nodata));
    debug!(
        path = %path.as_ref().display(),
        rows = grid.rows(),
        cols = grid.cols(),
        nodata,
        "created output raster from model"
    );
    OutputRaster::new(path, grid)
}

/// Writes a grid to `path` atomically.
pub fn write_raster(path: impl AsRef<Path>, grid: Grid<f64>) -> RasterResult<PathBuf> {
    OutputRaster::new(path, grid)?.commit()
}
