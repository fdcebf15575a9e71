//! GeoTIFF writing
//!
//! Single-band rasters are written as 32-bit float GeoTIFFs with pixel
//! scale, tiepoint, GeoKey directory and GDAL_NODATA tags, enough for GDAL
//! and this crate's reader to recover georeferencing and the sentinel.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::io::tags;
use crate::raster::{Raster, RasterElement};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tracing::debug;

/// Write a raster to a GeoTIFF file
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path)?);
    encode_geotiff(raster, file)?;
    debug!(path = %path.display(), rows = raster.rows(), cols = raster.cols(), "wrote GeoTIFF");
    Ok(())
}

/// Write a raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T: RasterElement>(raster: &Raster<T>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder.new_image::<Gray32Float>(cols as u32, rows as u32)?;

    let gt = raster.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;

    let geokeys = tags::geokeys_for(raster.crs().map(CRS::epsg));
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, geokeys.as_slice())?;

    // The sentinel is written at storage precision so it still matches its
    // own cells once they are narrowed to f32
    if let Some(nodata) = raster.nodata().and_then(RasterElement::to_f64) {
        let text = if nodata.is_nan() {
            "nan".to_string()
        } else {
            (nodata as f32).to_string()
        };
        image
            .encoder()
            .write_tag(Tag::GdalNodata, text.as_str())?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
