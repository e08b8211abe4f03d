//! Synchronized iteration over N loss grids and one output grid.
//!
//! [`GridZip`] walks every cell in row-major order. For each cell it hands
//! out the N loss samples (one per source, in source order) together with a
//! mutable slot in the output grid. Sources are read a whole row at a time
//! into a scratch buffer, so per-cell work never touches the I/O layer.

use floodrisk_core::{CoreError, Grid, GridSource};
use ndarray::ArrayViewMut2;

use crate::error::{EngineError, EngineResult};

/// Fails with `DimensionMismatch` naming the first source whose shape
/// differs from `shape`.
pub fn check_alignment(sources: &[&dyn GridSource<f64>], shape: (usize, usize)) -> EngineResult<()> {
    for source in sources {
        let actual = source.shape();
        if actual != shape {
            return Err(CoreError::dimension_mismatch(source.label(), shape, actual).into());
        }
    }
    Ok(())
}

/// One visited cell.
#[derive(Debug)]
pub struct ZipCell<'z> {
    /// Row in the full grid.
    pub row: usize,
    /// Column.
    pub col: usize,
    /// Loss samples, one per source, in source order.
    pub losses: &'z [f64],
    /// Output slot for this cell.
    pub out: &'z mut f64,
}

/// Lock-step cursor over N sources and an output grid (or a band of its rows).
///
/// Single pass: once exhausted, or after a read failure, it yields nothing more.
pub struct GridZip<'a> {
    sources: Vec<&'a dyn GridSource<f64>>,
    out: ArrayViewMut2<'a, f64>,
    first_row: usize,
    cols: usize,
    rows_buf: Vec<f64>,
    losses: Vec<f64>,
    cursor: usize,
}

impl<'a> GridZip<'a> {
    /// Zips `sources` with `out`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if any source is not shaped like `out`.
    pub fn new(sources: Vec<&'a dyn GridSource<f64>>, out: &'a mut Grid<f64>) -> EngineResult<Self> {
        check_alignment(&sources, out.shape())?;
        Ok(Self::band(sources, out.view_mut(), 0))
    }

    /// Zips `sources` with a band of output rows starting at `first_row`.
    ///
    /// Alignment must already have been checked against the full grid.
    pub(crate) fn band(
        sources: Vec<&'a dyn GridSource<f64>>,
        out: ArrayViewMut2<'a, f64>,
        first_row: usize,
    ) -> Self {
        let cols = out.ncols();
        let n = sources.len();
        Self {
            sources,
            out,
            first_row,
            cols,
            rows_buf: vec![0.0; n * cols],
            losses: vec![0.0; n],
            cursor: 0,
        }
    }

    /// Number of cells this cursor covers.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// True if there is nothing to visit.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Advances to the next cell.
    ///
    /// Returns `Ok(None)` once every cell has been visited.
    ///
    /// # Errors
    ///
    /// `IOFailure` if a source row cannot be read. The cursor is then
    /// exhausted.
    pub fn next_cell(&mut self) -> EngineResult<Option<ZipCell<'_>>> {
        if self.cursor >= self.out.len() {
            return Ok(None);
        }
        let (row, col) = (self.cursor / self.cols, self.cursor % self.cols);
        if col == 0 {
            if let Err(err) = self.load_row(row) {
                self.cursor = self.out.len();
                return Err(err);
            }
        }
        for (i, slot) in self.losses.iter_mut().enumerate() {
            *slot = self.rows_buf[i * self.cols + col];
        }
        self.cursor += 1;

        Ok(Some(ZipCell {
            row: self.first_row + row,
            col,
            losses: &self.losses,
            out: &mut self.out[[row, col]],
        }))
    }

    /// Drives the cursor to the end, calling `f` on every cell.
    pub fn for_each_cell<F>(mut self, mut f: F) -> EngineResult<()>
    where
        F: FnMut(ZipCell<'_>),
    {
        while let Some(cell) = self.next_cell()? {
            f(cell);
        }
        Ok(())
    }

    fn load_row(&mut self, row: usize) -> EngineResult<()> {
        let global = self.first_row + row;
        for (source, buf) in self.sources.iter().zip(self.rows_buf.chunks_mut(self.cols)) {
            source
                .read_row(global, buf)
                .map_err(|err| read_failure(*source, global, err))?;
        }
        Ok(())
    }
}

fn read_failure(source: &dyn GridSource<f64>, row: usize, err: CoreError) -> EngineError {
    match err {
        CoreError::IoFailure { .. } => err.into(),
        other => CoreError::io_failure(source.label(), format!("reading row {row}: {other}")).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize, offset: f64) -> Grid<f64> {
        let values = (0..rows * cols).map(|i| i as f64 + offset).collect();
        Grid::from_vec(rows, cols, values).unwrap()
    }

    fn sources<'a>(grids: &[&'a Grid<f64>]) -> Vec<&'a dyn GridSource<f64>> {
        grids.iter().map(|g| *g as &dyn GridSource<f64>).collect()
    }

    #[test]
    fn test_row_major_lock_step() {
        let a = ramp(2, 3, 0.0);
        let b = ramp(2, 3, 100.0);
        let mut out = Grid::new(2, 3, 0.0);
        let mut seen = Vec::new();

        let mut zip = GridZip::new(sources(&[&a, &b]), &mut out).unwrap();
        assert_eq!(zip.len(), 6);
        while let Some(cell) = zip.next_cell().unwrap() {
            seen.push((cell.row, cell.col, cell.losses.to_vec()));
            *cell.out = cell.losses[0] + cell.losses[1];
        }

        assert_eq!(seen.len(), 6);
        assert_eq!(seen[0], (0, 0, vec![0.0, 100.0]));
        assert_eq!(seen[4], (1, 1, vec![4.0, 104.0]));
        assert_eq!(out.get(1, 2), Some(5.0 + 105.0));
    }

    #[test]
    fn test_single_pass() {
        let a = ramp(1, 2, 0.0);
        let mut out = Grid::new(1, 2, 0.0);
        let mut zip = GridZip::new(sources(&[&a]), &mut out).unwrap();
        assert!(zip.next_cell().unwrap().is_some());
        assert!(zip.next_cell().unwrap().is_some());
        assert!(zip.next_cell().unwrap().is_none());
        assert!(zip.next_cell().unwrap().is_none());
    }

    #[test]
    fn test_dimension_mismatch_names_source() {
        let a = ramp(2, 2, 0.0);
        let b = ramp(2, 3, 0.0);
        let mut out = Grid::new(2, 2, 0.0);
        let err = GridZip::new(sources(&[&a, &b]), &mut out).err().unwrap();
        assert_eq!(err.kind(), "DimensionMismatch");
        assert!(err.to_string().contains("2x3"));
    }

    #[test]
    fn test_band_reports_global_rows() {
        let a = ramp(4, 2, 0.0);
        let mut out = Grid::new(4, 2, 0.0);
        let mut view = out.view_mut();
        let band = view.slice_mut(ndarray::s![2..4, ..]);
        let mut rows = Vec::new();
        GridZip::band(sources(&[&a]), band, 2)
            .for_each_cell(|cell| {
                rows.push(cell.row);
                *cell.out = cell.losses[0];
            })
            .unwrap();
        assert_eq!(rows, vec![2, 2, 3, 3]);
        assert_eq!(out.get(3, 1), Some(7.0));
        assert_eq!(out.get(0, 0), Some(0.0));
    }

    #[test]
    fn test_empty_grid_yields_nothing() {
        let a: Grid<f64> = Grid::new(0, 0, 0.0);
        let mut out = Grid::new(0, 0, 0.0);
        let mut zip = GridZip::new(sources(&[&a]), &mut out).unwrap();
        assert!(zip.is_empty());
        assert!(zip.next_cell().unwrap().is_none());
    }
}
