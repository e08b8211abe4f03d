//! ESRI ASCII grid (`.asc`) reader and writer.
//!
//! The format is a short case-insensitive header followed by `nrows` lines
//! of `ncols` whitespace-separated values, top row first:
//!
//! ```text
//! ncols        4
//! nrows        2
//! xllcorner    500000.0
//! yllcorner    6100000.0
//! cellsize     25.0
//! NODATA_value -9999
//! 0 0 12.5 40
//! 0 3 18 51.25
//! ```
//!
//! The projection, when present, lives in a `.prj` sidecar handled by the
//! crate-level open and commit functions.

use std::io::{BufRead, Write};

use floodrisk_core::{GeoReference, Grid};

use crate::error::{RasterError, RasterResult};

/// Upper bound on cells reserved from the header before any are read.
const MAX_PREALLOC: usize = 1 << 20;

#[derive(Debug, Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    /// (value, is_center)
    xll: Option<(f64, bool)>,
    yll: Option<(f64, bool)>,
    dx: Option<f64>,
    dy: Option<f64>,
    nodata: Option<f64>,
}

impl Header {
    /// Records a header entry. Returns `Ok(false)` if `key` is not a header key.
    fn set(&mut self, key: &str, raw: Option<&str>, label: &str, line: usize) -> RasterResult<bool> {
        let known = matches!(
            key,
            "ncols"
                | "nrows"
                | "xllcorner"
                | "xllcenter"
                | "yllcorner"
                | "yllcenter"
                | "cellsize"
                | "dx"
                | "dy"
                | "nodata_value"
        );
        if !known {
            return Ok(false);
        }

        let raw = raw.ok_or_else(|| RasterError::parse(label, line, format!("missing value for {key}")))?;
        let value: f64 = raw
            .parse()
            .map_err(|_| RasterError::parse(label, line, format!("invalid {key} '{raw}'")))?;

        match key {
            "ncols" => self.ncols = Some(dimension(key, value, label, line)?),
            "nrows" => self.nrows = Some(dimension(key, value, label, line)?),
            "xllcorner" => self.xll = Some((value, false)),
            "xllcenter" => self.xll = Some((value, true)),
            "yllcorner" => self.yll = Some((value, false)),
            "yllcenter" => self.yll = Some((value, true)),
            "cellsize" => {
                self.dx = Some(value);
                self.dy = Some(value);
            }
            "dx" => self.dx = Some(value),
            "dy" => self.dy = Some(value),
            _ => self.nodata = Some(value),
        }
        Ok(true)
    }
}

fn dimension(key: &str, value: f64, label: &str, line: usize) -> RasterResult<usize> {
    if value < 1.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
        return Err(RasterError::parse(
            label,
            line,
            format!("{key} must be a positive integer, got {value}"),
        ));
    }
    Ok(value as usize)
}

fn required<T>(value: Option<T>, key: &str, label: &str) -> RasterResult<T> {
    value.ok_or_else(|| RasterError::parse(label, 0, format!("header is missing {key}")))
}

/// Reads an ASCII grid from `reader`. `label` names the source in errors.
pub fn read_ascii_grid<R: BufRead>(reader: R, label: &str) -> RasterResult<Grid<f64>> {
    let mut header = Header::default();
    let mut values: Vec<f64> = Vec::new();
    let mut in_data = false;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| RasterError::io(label, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if !in_data {
            let mut parts = trimmed.split_whitespace();
            let key = parts.next().unwrap_or_default().to_ascii_lowercase();
            if header.set(&key, parts.next(), label, line_no)? {
                continue;
            }
            in_data = true;
            if let (Some(rows), Some(cols)) = (header.nrows, header.ncols) {
                values.reserve(rows.saturating_mul(cols).min(MAX_PREALLOC));
            }
        }

        for token in trimmed.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| {
                RasterError::parse(label, line_no, format!("invalid cell value '{token}'"))
            })?;
            values.push(value);
        }
    }

    let ncols = required(header.ncols, "ncols", label)?;
    let nrows = required(header.nrows, "nrows", label)?;
    let (xll, x_center) = required(header.xll, "xllcorner", label)?;
    let (yll, y_center) = required(header.yll, "yllcorner", label)?;
    let dx = required(header.dx, "cellsize", label)?;
    let dy = required(header.dy, "cellsize", label)?;

    if dx <= 0.0 || dy <= 0.0 {
        return Err(RasterError::parse(label, 0, "cell size must be positive"));
    }

    let expected = nrows.checked_mul(ncols).ok_or_else(|| {
        RasterError::parse(label, 0, format!("{nrows}x{ncols} grid is too large"))
    })?;
    if values.len() != expected {
        return Err(RasterError::parse(
            label,
            0,
            format!(
                "expected {expected} cell values for {nrows}x{ncols}, found {}",
                values.len()
            ),
        ));
    }

    let left = if x_center { xll - dx / 2.0 } else { xll };
    let bottom = if y_center { yll - dy / 2.0 } else { yll };
    let top = bottom + nrows as f64 * dy;

    let geo = GeoReference {
        transform: [left, dx, 0.0, top, 0.0, -dy],
        projection: None,
    };

    let grid = Grid::from_vec(nrows, ncols, values)
        .map_err(|e| RasterError::parse(label, 0, e.to_string()))?
        .with_geo(geo)
        .with_nodata(header.nodata);
    Ok(grid)
}

/// Writes `grid` as an ASCII grid.
///
/// # Errors
///
/// Fails with `UnsupportedGeoreference` for rotated or south-up transforms,
/// which the format cannot represent.
pub fn write_ascii_grid<W: Write>(grid: &Grid<f64>, mut writer: W, label: &str) -> RasterResult<()> {
    let geo = grid.geo();
    if !geo.is_axis_aligned() {
        return Err(RasterError::UnsupportedGeoreference {
            path: label.to_string(),
            reason: "rotated geotransforms cannot be stored in an ASCII grid".into(),
        });
    }
    let (left, top) = geo.origin();
    let (dx, dy) = geo.pixel_size();
    if dx <= 0.0 || dy >= 0.0 {
        return Err(RasterError::UnsupportedGeoreference {
            path: label.to_string(),
            reason: format!("ASCII grids must be north-up, got pixel size ({dx}, {dy})"),
        });
    }
    let dy = -dy;
    let bottom = top - grid.rows() as f64 * dy;

    let io = |e| RasterError::io(label, e);

    writeln!(writer, "ncols        {}", grid.cols()).map_err(io)?;
    writeln!(writer, "nrows        {}", grid.rows()).map_err(io)?;
    writeln!(writer, "xllcorner    {left}").map_err(io)?;
    writeln!(writer, "yllcorner    {bottom}").map_err(io)?;
    if (dx - dy).abs() <= f64::EPSILON * dx.max(dy) {
        writeln!(writer, "cellsize     {dx}").map_err(io)?;
    } else {
        writeln!(writer, "dx           {dx}").map_err(io)?;
        writeln!(writer, "dy           {dy}").map_err(io)?;
    }
    if let Some(nodata) = grid.nodata() {
        writeln!(writer, "NODATA_value {nodata}").map_err(io)?;
    }

    for row in grid.rows_iter() {
        let mut first = true;
        for value in row.iter() {
            if first {
                write!(writer, "{value}").map_err(io)?;
                first = false;
            } else {
                write!(writer, " {value}").map_err(io)?;
            }
        }
        writeln!(writer).map_err(io)?;
    }
    writer.flush().map_err(io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = "\
NCOLS 3
NROWS 2
XLLCORNER 1000.0
YLLCORNER 2000.0
CELLSIZE 10
NODATA_value -9999
1 2 3
4 -9999 6.5
";

    #[test]
    fn test_read_sample() {
        let grid = read_ascii_grid(SAMPLE.as_bytes(), "sample.asc").unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.get(0, 0), Some(1.0));
        assert_eq!(grid.get(1, 2), Some(6.5));
        assert_eq!(grid.nodata(), Some(-9999.0));
        assert!(grid.is_nodata(&grid.get(1, 1).unwrap()));
        assert_eq!(grid.geo().transform, [1000.0, 10.0, 0.0, 2020.0, 0.0, -10.0]);
    }

    #[test]
    fn test_oversized_header_is_a_parse_error() {
        let text = "ncols 4000000000\nnrows 4000000000\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n";
        let err = read_ascii_grid(text.as_bytes(), "huge.asc").unwrap_err();
        assert!(matches!(err, RasterError::Parse { .. }));
    }

    #[test]
    fn test_overflowing_header_is_a_parse_error() {
        let text = format!(
            "ncols {}\nnrows 3\nxllcorner 0\nyllcorner 0\ncellsize 1\n1\n",
            usize::MAX / 2
        );
        let err = read_ascii_grid(text.as_bytes(), "overflow.asc").unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_read_center_registration() {
        let text = "ncols 1\nnrows 1\nxllcenter 5\nyllcenter 5\ncellsize 10\n42\n";
        let grid = read_ascii_grid(text.as_bytes(), "c.asc").unwrap();
        assert_eq!(grid.geo().origin(), (0.0, 10.0));
        assert_eq!(grid.nodata(), None);
    }

    #[test]
    fn test_values_may_wrap_lines() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n4\n";
        let grid = read_ascii_grid(text.as_bytes(), "w.asc").unwrap();
        assert_eq!(grid.get(1, 0), Some(3.0));
    }

    #[test]
    fn test_wrong_value_count() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
        let err = read_ascii_grid(text.as_bytes(), "short.asc").unwrap_err();
        assert!(err.to_string().contains("expected 4 cell values"));
    }

    #[test]
    fn test_missing_header() {
        let text = "ncols 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n";
        let err = read_ascii_grid(text.as_bytes(), "nohdr.asc").unwrap_err();
        assert!(err.to_string().contains("nrows"));
    }

    #[test]
    fn test_bad_value_reports_line() {
        let text = "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 abc\n";
        match read_ascii_grid(text.as_bytes(), "bad.asc").unwrap_err() {
            RasterError::Parse { line, .. } => assert_eq!(line, 6),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_then_read() {
        let grid = read_ascii_grid(SAMPLE.as_bytes(), "sample.asc").unwrap();
        let mut buf = Vec::new();
        write_ascii_grid(&grid, &mut buf, "out.asc").unwrap();
        let back = read_ascii_grid(buf.as_slice(), "out.asc").unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_write_rectangular_cells() {
        let geo = GeoReference {
            transform: [0.0, 2.0, 0.0, 10.0, 0.0, -5.0],
            projection: None,
        };
        let grid = Grid::new(2, 2, 0.25).with_geo(geo);
        let mut buf = Vec::new();
        write_ascii_grid(&grid, &mut buf, "rect.asc").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("dx           2"));
        assert!(text.contains("dy           5"));
        let back = read_ascii_grid(text.as_bytes(), "rect.asc").unwrap();
        assert_relative_eq!(back.geo().transform[3], 10.0);
    }

    #[test]
    fn test_write_rejects_rotation() {
        let geo = GeoReference {
            transform: [0.0, 1.0, 0.1, 0.0, 0.0, -1.0],
            projection: None,
        };
        let grid = Grid::new(1, 1, 0.0).with_geo(geo);
        assert!(matches!(
            write_ascii_grid(&grid, Vec::new(), "rot.asc"),
            Err(RasterError::UnsupportedGeoreference { .. })
        ));
    }
}
