//! Georeferenced grids.
//!
//! A [`Grid`] is a dense, row-major 2D array of samples with an optional
//! no-data sentinel and a [`GeoReference`] that is carried through
//! unmodified. The core never interprets the spatial reference; it only
//! copies it from a template grid onto an output grid.

use ndarray::{Array2, ArrayView1, ArrayViewMut2};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::traits::{GridShape, GridSink, GridSource};

/// Spatial reference of a grid.
///
/// `transform` follows the GDAL affine convention:
/// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`,
/// where the origin is the top-left corner of the top-left cell. The default
/// is a north-up unit grid anchored at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoReference {
    /// Affine geotransform coefficients.
    pub transform: [f64; 6],
    /// Projection definition (WKT, EPSG code, ...), if known.
    pub projection: Option<String>,
}

impl Default for GeoReference {
    fn default() -> Self {
        Self {
            transform: [0.0, 1.0, 0.0, 0.0, 0.0, -1.0],
            projection: None,
        }
    }
}

impl GeoReference {
    /// Creates a north-up reference from the top-left corner and square cell size.
    #[must_use]
    pub fn north_up(origin_x: f64, origin_y: f64, cell_size: f64) -> Self {
        Self {
            transform: [origin_x, cell_size, 0.0, origin_y, 0.0, -cell_size],
            projection: None,
        }
    }

    /// Attaches a projection definition.
    #[must_use]
    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    /// Top-left corner `(x, y)`.
    pub fn origin(&self) -> (f64, f64) {
        (self.transform[0], self.transform[3])
    }

    /// Pixel size `(width, height)`; height is negative for north-up grids.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.transform[1], self.transform[5])
    }

    /// True when the transform has no rotation terms.
    pub fn is_axis_aligned(&self) -> bool {
        self.transform[2] == 0.0 && self.transform[4] == 0.0
    }
}

/// A dense georeferenced 2D grid of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    data: Array2<T>,
    geo: GeoReference,
    nodata: Option<T>,
}

impl<T: Copy> Grid<T> {
    /// Creates a `rows x cols` grid filled with `fill`.
    #[must_use]
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), fill),
            geo: GeoReference::default(),
            nodata: None,
        }
    }

    /// Wraps an existing array.
    #[must_use]
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data: data.as_standard_layout().into_owned(),
            geo: GeoReference::default(),
            nodata: None,
        }
    }

    /// Builds a grid from row-major values.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidParameter` if `values.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<T>) -> CoreResult<Self> {
        let len = values.len();
        let data = Array2::from_shape_vec((rows, cols), values).map_err(|_| {
            CoreError::invalid_parameter(
                "values",
                format!("{len} values cannot fill a {rows}x{cols} grid"),
            )
        })?;
        Ok(Self::from_array(data))
    }

    /// Creates a grid with the same shape and georeference as `model`.
    ///
    /// The no-data sentinel is not inherited; set it with [`Grid::with_nodata`].
    #[must_use]
    pub fn from_model<U>(model: &Grid<U>, fill: T) -> Self {
        Self {
            data: Array2::from_elem(model.shape(), fill),
            geo: model.geo.clone(),
            nodata: None,
        }
    }

    /// Sets the georeference.
    #[must_use]
    pub fn with_geo(mut self, geo: GeoReference) -> Self {
        self.geo = geo;
        self
    }

    /// Sets the no-data sentinel.
    #[must_use]
    pub fn with_nodata(mut self, nodata: Option<T>) -> Self {
        self.nodata = nodata;
        self
    }

    /// Returns the sample at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.data.get((row, col)).copied()
    }

    /// Overwrites the sample at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> CoreResult<()> {
        let (rows, cols) = self.shape();
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(CoreError::OutOfBounds {
                row,
                col,
                rows,
                cols,
            }),
        }
    }

    /// Returns the no-data sentinel.
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Replaces the no-data sentinel.
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }
}

impl<T> Grid<T> {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Spatial reference.
    pub fn geo(&self) -> &GeoReference {
        &self.geo
    }

    /// Mutable spatial reference.
    pub fn geo_mut(&mut self) -> &mut GeoReference {
        &mut self.geo
    }

    /// Borrows one row.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`.
    pub fn row(&self, row: usize) -> ArrayView1<'_, T> {
        self.data.row(row)
    }

    /// Iterates over rows, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = ArrayView1<'_, T>> {
        self.data.rows().into_iter()
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Underlying array.
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Mutable view of the underlying array.
    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, T> {
        self.data.view_mut()
    }

    /// Consumes the grid and returns its array.
    pub fn into_array(self) -> Array2<T> {
        self.data
    }
}

impl<T: PartialEq> Grid<T> {
    /// True if `value` equals the no-data sentinel.
    pub fn is_nodata(&self, value: &T) -> bool {
        self.nodata.as_ref().is_some_and(|nd| nd == value)
    }
}

impl<T> GridShape for Grid<T> {
    fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }
}

impl<T: Copy + Send + Sync> GridSource<T> for Grid<T> {
    fn geo_reference(&self) -> &GeoReference {
        &self.geo
    }

    fn nodata(&self) -> Option<T> {
        self.nodata
    }

    fn read(&self, row: usize, col: usize) -> CoreResult<T> {
        let (rows, cols) = self.data.dim();
        self.data
            .get((row, col))
            .copied()
            .ok_or(CoreError::OutOfBounds {
                row,
                col,
                rows,
                cols,
            })
    }

    fn read_row(&self, row: usize, buf: &mut [T]) -> CoreResult<()> {
        let (rows, cols) = self.data.dim();
        if row >= rows {
            return Err(CoreError::OutOfBounds {
                row,
                col: 0,
                rows,
                cols,
            });
        }
        if buf.len() != cols {
            return Err(CoreError::invalid_parameter(
                "buf",
                format!("row buffer holds {} samples, grid has {cols} columns", buf.len()),
            ));
        }
        for (dst, src) in buf.iter_mut().zip(self.data.row(row).iter()) {
            *dst = *src;
        }
        Ok(())
    }
}

impl<T: Copy> GridSink<T> for Grid<T> {
    fn write(&mut self, row: usize, col: usize, value: T) -> CoreResult<()> {
        self.set(row, col, value)
    }
}
