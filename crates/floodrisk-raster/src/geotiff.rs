//! Single-band GeoTIFF reader and writer built on the `tiff` crate.
//!
//! Georeferencing is read from `ModelPixelScale` + `ModelTiepoint` or from
//! `ModelTransformation`, and the no-data sentinel from `GDAL_NODATA`.
//! Output is always written as a Float64 grey image.

use std::io::{Read, Seek, Write};

use floodrisk_core::{GeoReference, Grid};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::debug;

use crate::error::{RasterError, RasterResult};

const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GT_CITATION: u16 = 1026;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Reads the first image of a TIFF stream as a `Grid<f64>`.
pub fn read_geotiff<R: Read + Seek>(reader: R, label: &str) -> RasterResult<Grid<f64>> {
    let err = |e: tiff::TiffError| RasterError::tiff(label, e);

    let mut decoder = Decoder::new(reader)
        .map_err(err)?
        .with_limits(Limits::unlimited());

    let color = decoder.colortype().map_err(err)?;
    if !matches!(color, ColorType::Gray(_)) {
        return Err(RasterError::UnsupportedFormat {
            path: label.to_string(),
            reason: format!("expected a single-band image, found {color:?}"),
        });
    }

    let (width, height) = decoder.dimensions().map_err(err)?;
    let geo = read_georeference(&mut decoder, label)?;
    let nodata = read_nodata(&mut decoder, label)?;

    let values: Vec<f64> = match decoder.read_image().map_err(err)? {
        DecodingResult::F64(v) => v,
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(RasterError::UnsupportedFormat {
                path: label.to_string(),
                reason: "unsupported sample format".into(),
            })
        }
    };

    debug!(path = label, width, height, ?nodata, "decoded GeoTIFF");

    let grid = Grid::from_vec(height as usize, width as usize, values)
        .map_err(|e| RasterError::parse(label, 0, e.to_string()))?
        .with_geo(geo)
        .with_nodata(nodata);
    Ok(grid)
}

fn read_georeference<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    label: &str,
) -> RasterResult<GeoReference> {
    let err = |e: tiff::TiffError| RasterError::tiff(label, e);

    let mut geo = GeoReference::default();

    if let Some(m) = decoder.find_tag(Tag::ModelTransformationTag).map_err(err)? {
        let m = m.into_f64_vec().map_err(err)?;
        if m.len() < 8 {
            return Err(RasterError::parse(label, 0, "ModelTransformation needs 16 values"));
        }
        geo.transform = [m[3], m[0], m[1], m[7], m[4], m[5]];
    } else if let Some(scale) = decoder.find_tag(Tag::ModelPixelScaleTag).map_err(err)? {
        let scale = scale.into_f64_vec().map_err(err)?;
        let tie = match decoder.find_tag(Tag::ModelTiepointTag).map_err(err)? {
            Some(t) => t.into_f64_vec().map_err(err)?,
            None => vec![0.0; 6],
        };
        if scale.len() < 2 || tie.len() < 6 {
            return Err(RasterError::parse(label, 0, "incomplete pixel scale or tiepoint"));
        }
        let (sx, sy) = (scale[0], scale[1]);
        let origin_x = tie[3] - tie[0] * sx;
        let origin_y = tie[4] + tie[1] * sy;
        geo.transform = [origin_x, sx, 0.0, origin_y, 0.0, -sy];
    }

    geo.projection = read_projection(decoder, label)?;
    Ok(geo)
}

fn read_projection<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    label: &str,
) -> RasterResult<Option<String>> {
    let err = |e: tiff::TiffError| RasterError::tiff(label, e);

    let keys = match decoder.find_tag(Tag::GeoKeyDirectoryTag).map_err(err)? {
        Some(v) => v.into_u16_vec().map_err(err)?,
        None => return Ok(None),
    };
    let ascii = match decoder.find_tag(Tag::GeoAsciiParamsTag).map_err(err)? {
        Some(v) => Some(v.into_string().map_err(err)?),
        None => None,
    };

    let mut citation = None;
    for entry in keys.get(4..).unwrap_or_default().chunks_exact(4) {
        let (key, location, count, offset) = (entry[0], entry[1], entry[2], entry[3]);
        match key {
            PROJECTED_CS_TYPE | GEOGRAPHIC_TYPE if location == 0 && offset != 32767 => {
                return Ok(Some(format!("EPSG:{offset}")));
            }
            GT_CITATION if location == Tag::GeoAsciiParamsTag.to_u16() => {
                citation = ascii.as_deref().and_then(|s| {
                    let start = usize::from(offset);
                    let end = start + usize::from(count);
                    s.get(start..end)
                        .map(|c| c.trim_end_matches(['|', '\0']).to_string())
                });
            }
            _ => {}
        }
    }
    Ok(citation.filter(|c| !c.is_empty()))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>, label: &str) -> RasterResult<Option<f64>> {
    let err = |e: tiff::TiffError| RasterError::tiff(label, e);
    match decoder.find_tag(Tag::GdalNodata).map_err(err)? {
        Some(v) => {
            let text = v.into_string().map_err(err)?;
            let text = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
            let value = text
                .parse::<f64>()
                .map_err(|_| RasterError::parse(label, 0, format!("invalid GDAL_NODATA '{text}'")))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Builds the GeoKey directory and ASCII params for a projection string.
fn geo_keys(projection: Option<&str>) -> (Vec<u16>, Option<String>) {
    let mut entries: Vec<[u16; 4]> = Vec::new();
    let mut ascii = None;

    let epsg = projection
        .and_then(|p| p.strip_prefix("EPSG:"))
        .and_then(|code| code.trim().parse::<u16>().ok());

    match (projection, epsg) {
        (_, Some(code)) => {
            let (model, key) = if (4000..5000).contains(&code) {
                (MODEL_TYPE_GEOGRAPHIC, GEOGRAPHIC_TYPE)
            } else {
                (MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE)
            };
            entries.push([GT_MODEL_TYPE, 0, 1, model]);
            entries.push([GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]);
            entries.push([key, 0, 1, code]);
        }
        (Some(text), None) => {
            let params = format!("{text}|");
            let count = u16::try_from(params.len()).unwrap_or(u16::MAX);
            entries.push([GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]);
            entries.push([GT_CITATION, Tag::GeoAsciiParamsTag.to_u16(), count, 0]);
            ascii = Some(params);
        }
        (None, None) => {
            entries.push([GT_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA]);
        }
    }

    let mut keys = vec![1, 1, 0, entries.len() as u16];
    for entry in entries {
        keys.extend_from_slice(&entry);
    }
    (keys, ascii)
}

/// Writes `grid` as a Float64 GeoTIFF.
pub fn write_geotiff<W: Write + Seek>(grid: &Grid<f64>, writer: W, label: &str) -> RasterResult<()> {
    let err = |e: tiff::TiffError| RasterError::tiff(label, e);

    let width = u32::try_from(grid.cols()).map_err(|_| RasterError::UnsupportedFormat {
        path: label.to_string(),
        reason: "width exceeds TIFF limits".into(),
    })?;
    let height = u32::try_from(grid.rows()).map_err(|_| RasterError::UnsupportedFormat {
        path: label.to_string(),
        reason: "height exceeds TIFF limits".into(),
    })?;

    let geo = grid.geo();
    let t = geo.transform;
    let (keys, ascii) = geo_keys(geo.projection.as_deref());
    let values: Vec<f64> = grid.cells().copied().collect();

    let mut encoder = TiffEncoder::new(writer).map_err(err)?;
    let mut image = encoder
        .new_image::<colortype::Gray64Float>(width, height)
        .map_err(err)?;

    if geo.is_axis_aligned() && t[5] < 0.0 {
        let scale = [t[1], -t[5], 0.0];
        let tie = [0.0, 0.0, 0.0, t[0], t[3], 0.0];
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &scale[..])
            .map_err(err)?;
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tie[..])
            .map_err(err)?;
    } else {
        let m = [
            t[1], t[2], 0.0, t[0], //
            t[4], t[5], 0.0, t[3], //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        image
            .encoder()
            .write_tag(Tag::ModelTransformationTag, &m[..])
            .map_err(err)?;
    }

    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &keys[..])
        .map_err(err)?;
    if let Some(ascii) = ascii {
        image
            .encoder()
            .write_tag(Tag::GeoAsciiParamsTag, ascii.as_str())
            .map_err(err)?;
    }
    if let Some(nodata) = grid.nodata() {
        let text = nodata.to_string();
        image
            .encoder()
            .write_tag(Tag::GdalNodata, text.as_str())
            .map_err(err)?;
    }

    image.write_data(&values).map_err(err)?;
    debug!(path = label, width, height, "encoded GeoTIFF");
    Ok(())
}
