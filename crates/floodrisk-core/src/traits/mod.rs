//! Core traits for Floodrisk.
//!
//! These traits are the seam between the risk engine and whatever holds
//! the pixels: an in-memory [`Grid`](crate::Grid), a raster file reader, or
//! a test double that fails on demand.

use crate::error::CoreResult;
use crate::grid::GeoReference;

/// Anything with a fixed `rows x cols` extent.
pub trait GridShape {
    /// `(rows, cols)`.
    fn shape(&self) -> (usize, usize);

    /// Number of rows.
    fn n_rows(&self) -> usize {
        self.shape().0
    }

    /// Number of columns.
    fn n_cols(&self) -> usize {
        self.shape().1
    }
}

/// Read access to a georeferenced grid.
///
/// Implementors must be shareable across threads so a pass may read
/// disjoint rows concurrently.
pub trait GridSource<T>: GridShape + Send + Sync {
    /// Spatial reference, passed through to outputs unmodified.
    fn geo_reference(&self) -> &GeoReference;

    /// No-data sentinel declared by the source, if any.
    fn nodata(&self) -> Option<T>;

    /// Reads the pixel at `(row, col)`.
    fn read(&self, row: usize, col: usize) -> CoreResult<T>;

    /// Reads a full row into `buf`, which must hold exactly `n_cols()` samples.
    fn read_row(&self, row: usize, buf: &mut [T]) -> CoreResult<()> {
        for (col, slot) in buf.iter_mut().enumerate() {
            *slot = self.read(row, col)?;
        }
        Ok(())
    }

    /// Human-readable name used in error messages.
    fn label(&self) -> &str {
        "grid"
    }
}

/// Write access to a grid.
pub trait GridSink<T>: GridShape {
    /// Writes the pixel at `(row, col)`.
    fn write(&mut self, row: usize, col: usize, value: T) -> CoreResult<()>;

    /// Writes a full row starting at column zero.
    fn write_row(&mut self, row: usize, values: &[T]) -> CoreResult<()>
    where
        T: Copy,
    {
        for (col, value) in values.iter().enumerate() {
            self.write(row, col, *value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    /// A source that synthesises `row * 10 + col`.
    struct Ramp {
        geo: GeoReference,
    }

    impl GridShape for Ramp {
        fn shape(&self) -> (usize, usize) {
            (3, 4)
        }
    }

    impl GridSource<f64> for Ramp {
        fn geo_reference(&self) -> &GeoReference {
            &self.geo
        }

        fn nodata(&self) -> Option<f64> {
            None
        }

        fn read(&self, row: usize, col: usize) -> CoreResult<f64> {
            if row >= 3 || col >= 4 {
                return Err(CoreError::io_failure("ramp", "outside"));
            }
            Ok((row * 10 + col) as f64)
        }
    }

    #[test]
    fn test_default_read_row() {
        let ramp = Ramp {
            geo: GeoReference::default(),
        };
        let mut buf = [0.0; 4];
        ramp.read_row(2, &mut buf).unwrap();
        assert_eq!(buf, [20.0, 21.0, 22.0, 23.0]);
        assert_eq!(ramp.n_rows(), 3);
        assert_eq!(ramp.n_cols(), 4);
        assert_eq!(ramp.label(), "grid");
    }

    #[test]
    fn test_default_read_row_propagates_errors() {
        let ramp = Ramp {
            geo: GeoReference::default(),
        };
        let mut buf = [0.0; 5];
        assert!(ramp.read_row(0, &mut buf).is_err());
    }
}
