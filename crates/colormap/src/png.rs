//! PNG output of rendered buffers

use crate::render::{classified_to_rgba, masked_to_rgba, ColormapParams};
use geolab_core::{ClassifiedRaster, Error, MaskedRaster, Result};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// Write a row-major RGBA buffer of `cols` x `rows` pixels as a PNG
pub fn save_png<P: AsRef<Path>>(path: P, rgba: &[u8], cols: usize, rows: usize) -> Result<()> {
    let img = RgbaImage::from_raw(cols as u32, rows as u32, rgba.to_vec()).ok_or_else(|| {
        Error::Render(format!(
            "buffer of {} bytes does not hold {}x{} RGBA pixels",
            rgba.len(),
            cols,
            rows
        ))
    })?;
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::Render(e.to_string()))
}

/// Render a masked raster with `params` and save it as a PNG
pub fn save_masked_png<P: AsRef<Path>>(
    path: P,
    raster: &MaskedRaster,
    params: &ColormapParams,
) -> Result<()> {
    let rgba = masked_to_rgba(raster, params);
    save_png(path, &rgba, raster.cols(), raster.rows())
}

/// Render class labels with the categorical palette and save as a PNG
pub fn save_classified_png<P: AsRef<Path>>(path: P, classes: &ClassifiedRaster) -> Result<()> {
    let rgba = classified_to_rgba(classes);
    let (rows, cols) = classes.shape();
    save_png(path, &rgba, cols, rows)
}
