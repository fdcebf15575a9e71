//! GeoTIFF tag numbers and parsing helpers shared by the reader and writer

use crate::error::{Error, Result};
use crate::metadata::DataType;
use crate::raster::GeoTransform;
use std::io::{Read, Seek};
use tiff::decoder::Decoder;
use tiff::tags::Tag;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// How samples are laid out in the file
#[derive(Debug, Clone, Copy)]
pub(crate) struct SampleLayout {
    pub samples_per_pixel: usize,
    pub data_type: DataType,
}

pub(crate) fn read_layout<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<SampleLayout> {
    let samples_per_pixel = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1) as usize;

    // Only chunky (interleaved) storage is decoded natively
    if decoder.get_tag_u32(Tag::PlanarConfiguration).unwrap_or(1) == 2 {
        return Err(Error::UnsupportedDataType(
            "planar-separate TIFF storage".to_string(),
        ));
    }

    let bits = first_u16(decoder, Tag::BitsPerSample).unwrap_or(1);
    let sample_format = first_u16(decoder, Tag::SampleFormat).unwrap_or(1);
    let data_type = DataType::from_tiff(sample_format, bits).ok_or_else(|| {
        Error::UnsupportedDataType(format!(
            "sample format {} with {} bits per sample",
            sample_format, bits
        ))
    })?;

    Ok(SampleLayout {
        samples_per_pixel,
        data_type,
    })
}

/// First value of a SHORT tag. A single value is decoded as a scalar and a
/// per-sample list as a vector; `get_tag_u32_vec` accepts both.
fn first_u16<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Option<u16> {
    decoder
        .get_tag_u32_vec(tag)
        .ok()
        .and_then(|values| values.first().copied())
        .and_then(|v| u16::try_from(v).ok())
}

/// GeoTransform from ModelPixelScale + ModelTiepoint, if both are present
pub(crate) fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;
    GeoTransform::from_tiepoint(&tiepoint, &scale)
}

pub(crate) fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| parse_nodata(&s))
}

pub(crate) fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<u32> {
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).ok()?;
    epsg_from_geokeys(&keys)
}

/// GDAL stores the sentinel as NUL-terminated ASCII, e.g. `"-9999\0"`
pub(crate) fn parse_nodata(text: &str) -> Option<f64> {
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}

/// EPSG code from a GeoKeyDirectory. A projected CRS key wins over a
/// geographic one; only inline (location 0) values are read.
pub(crate) fn epsg_from_geokeys(keys: &[u16]) -> Option<u32> {
    if keys.len() < 4 || keys[0] != 1 {
        return None;
    }
    let count = keys[3] as usize;
    let entries = keys[4..].chunks_exact(4).take(count);

    let mut geographic = None;
    let mut projected = None;
    for entry in entries {
        let (id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            continue;
        }
        match id {
            PROJECTED_CS_TYPE_KEY => projected = Some(value as u32),
            GEOGRAPHIC_TYPE_KEY => geographic = Some(value as u32),
            _ => {}
        }
    }
    projected.or(geographic)
}

/// Minimal GeoKeyDirectory for the writer. EPSG codes in 4000..5000 are
/// written as geographic, everything else as projected.
pub(crate) fn geokeys_for(epsg: Option<u32>) -> Vec<u16> {
    let model_type = match epsg {
        Some(code) if (4000..5000).contains(&code) => MODEL_TYPE_GEOGRAPHIC,
        _ => MODEL_TYPE_PROJECTED,
    };

    let mut entries = vec![
        [GT_MODEL_TYPE_KEY, 0, 1, model_type],
        [GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_AREA],
    ];
    if let Some(code) = epsg.and_then(|c| u16::try_from(c).ok()) {
        let key = if model_type == MODEL_TYPE_GEOGRAPHIC {
            GEOGRAPHIC_TYPE_KEY
        } else {
            PROJECTED_CS_TYPE_KEY
        };
        entries.push([key, 0, 1, code]);
    }

    let mut keys = vec![1, 1, 0, entries.len() as u16];
    keys.extend(entries.into_iter().flatten());
    keys
}
