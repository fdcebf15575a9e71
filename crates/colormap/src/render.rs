//! Masked and classified rasters to RGBA pixel buffers.

use crate::scheme::{categorical, evaluate, ColorScheme};
use geolab_core::{ClassifiedRaster, MaskedRaster};

/// Parameters for colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Minimum value for normalization. Values below this are clamped.
    pub min: f64,
    /// Maximum value for normalization. Values above this are clamped.
    pub max: f64,
    /// Color for excluded pixels (RGBA). Default: fully transparent.
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    /// Params over [0, 1]; use [`auto_params`] to fit the data instead.
    pub fn new(scheme: ColorScheme) -> Self {
        Self::with_range(scheme, 0.0, 1.0)
    }

    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            nodata_color: [0, 0, 0, 0],
        }
    }

    /// NDVI colors over the full index range [-1, 1]
    pub fn ndvi() -> Self {
        Self::with_range(ColorScheme::Ndvi, -1.0, 1.0)
    }
}

/// Fit min/max to the valid cells of `raster`.
///
/// An all-excluded raster gets [0, 1]; a constant one gets [v, v + 1].
pub fn auto_params(raster: &MaskedRaster, scheme: ColorScheme) -> ColormapParams {
    let stats = raster.statistics();
    match (stats.min, stats.max) {
        (Some(min), Some(max)) if (max - min).abs() < f64::EPSILON => {
            ColormapParams::with_range(scheme, min, min + 1.0)
        }
        (Some(min), Some(max)) => ColormapParams::with_range(scheme, min, max),
        _ => ColormapParams::with_range(scheme, 0.0, 1.0),
    }
}

/// Range centred on zero covering the largest absolute valid value, so that
/// "no change" lands on the middle of a divergent scheme.
pub fn symmetric_params(raster: &MaskedRaster, scheme: ColorScheme) -> ColormapParams {
    let extent = raster
        .valid_values()
        .map(f64::abs)
        .fold(0.0_f64, f64::max);
    let extent = if extent > 0.0 { extent } else { 1.0 };
    ColormapParams::with_range(scheme, -extent, extent)
}

/// Convert a masked raster to an RGBA pixel buffer.
///
/// Returns a `Vec<u8>` of length `rows * cols * 4` in row-major order.
/// Excluded pixels are rendered with `params.nodata_color`.
pub fn masked_to_rgba(raster: &MaskedRaster, params: &ColormapParams) -> Vec<u8> {
    let range = params.max - params.min;
    let inv_range = if range.abs() > f64::EPSILON {
        1.0 / range
    } else {
        1.0
    };

    let values = raster.raster().data().iter();
    let excluded = raster.mask().as_array().iter();

    let mut rgba = Vec::with_capacity(raster.len() * 4);
    for (&v, &excluded) in values.zip(excluded) {
        if excluded || !v.is_finite() {
            rgba.extend_from_slice(&params.nodata_color);
        } else {
            let t = (v - params.min) * inv_range;
            rgba.extend_from_slice(&evaluate(params.scheme, t).to_rgba(255));
        }
    }
    rgba
}

/// Convert class labels to RGBA with the categorical palette.
/// Cells without data are transparent.
pub fn classified_to_rgba(classes: &ClassifiedRaster) -> Vec<u8> {
    let labels = classes.labels().data().iter();
    let excluded = classes.mask().as_array().iter();

    let mut rgba = Vec::with_capacity(classes.labels().len() * 4);
    for (&label, &excluded) in labels.zip(excluded) {
        if excluded {
            rgba.extend_from_slice(&[0, 0, 0, 0]);
        } else {
            rgba.extend_from_slice(&categorical(label).to_rgba(255));
        }
    }
    rgba
}
