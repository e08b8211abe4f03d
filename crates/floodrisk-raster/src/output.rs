//! Output rasters that only appear on disk once fully written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use floodrisk_core::{GeoReference, Grid};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{RasterError, RasterResult};
use crate::{ascii, geotiff, RasterFormat};

/// A grid bound to its destination path.
///
/// The grid is populated in memory; [`OutputRaster::commit`] encodes it into
/// a temporary file next to the destination and renames it into place, so a
/// failed pass never leaves a half-written raster behind. Dropping an
/// uncommitted output writes nothing.
#[derive(Debug)]
pub struct OutputRaster {
    path: PathBuf,
    format: RasterFormat,
    grid: Grid<f64>,
}

impl OutputRaster {
    /// Binds `grid` to `path`, choosing the format from the extension.
    pub fn new(path: impl AsRef<Path>, grid: Grid<f64>) -> RasterResult<Self> {
        let path = path.as_ref().to_path_buf();
        let format = RasterFormat::from_path(&path)?;
        Ok(Self { path, format, grid })
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output format.
    pub fn format(&self) -> RasterFormat {
        self.format
    }

    /// The grid being populated.
    pub fn grid(&self) -> &Grid<f64> {
        &self.grid
    }

    /// Mutable access for the pass that fills the grid.
    pub fn grid_mut(&mut self) -> &mut Grid<f64> {
        &mut self.grid
    }

    /// Consumes the output without writing it.
    pub fn into_grid(self) -> Grid<f64> {
        self.grid
    }

    /// Encodes the grid and atomically moves it to its destination.
    pub fn commit(self) -> RasterResult<PathBuf> {
        let label = self.path.display().to_string();
        let dir = parent_dir(&self.path);

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RasterError::io(dir, e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            match self.format {
                RasterFormat::AsciiGrid => ascii::write_ascii_grid(&self.grid, &mut writer, &label)?,
                RasterFormat::GeoTiff => geotiff::write_geotiff(&self.grid, &mut writer, &label)?,
            }
            writer.flush().map_err(|e| RasterError::io(&self.path, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| RasterError::io(&self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| RasterError::io(&self.path, e.error))?;

        if self.format == RasterFormat::AsciiGrid {
            write_prj_sidecar(&self.path, self.grid.geo())?;
        }

        info!(
            path = %self.path.display(),
            rows = self.grid.rows(),
            cols = self.grid.cols(),
            "wrote output raster"
        );
        Ok(self.path)
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn write_prj_sidecar(path: &Path, geo: &GeoReference) -> RasterResult<()> {
    let Some(projection) = geo.projection.as_deref() else {
        return Ok(());
    };
    let prj = path.with_extension("prj");
    let dir = parent_dir(&prj);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RasterError::io(dir, e))?;
    writeln!(tmp, "{projection}").map_err(|e| RasterError::io(&prj, e))?;
    tmp.persist(&prj).map_err(|e| RasterError::io(&prj, e.error))?;
    debug!(path = %prj.display(), "wrote projection sidecar");
    Ok(())
}

/// Reads the `.prj` sidecar of an ASCII grid, if any.
pub(crate) fn read_prj_sidecar(path: &Path) -> RasterResult<Option<String>> {
    let prj = path.with_extension("prj");
    if !prj.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&prj).map_err(|e| RasterError::io(&prj, e))?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// Opens `path` for buffered reading.
pub(crate) fn open_file(path: &Path) -> RasterResult<File> {
    File::open(path).map_err(|e| RasterError::io(path, e))
}
