//! Normalized band-ratio indices
//!
//! Indices are computed per cell from two co-registered bands. A cell is
//! excluded when either band is excluded there or when the denominator is
//! exactly zero, so outputs never hold NaN or infinity.

use crate::kernel::{check_same_grid, masked_from_kernel, valid_at};
use geolab_core::{Error, MaskedRaster, MultiBandRaster, Result};
use tracing::{debug, warn};

/// What to do with normalized-difference values outside [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutOfRangePolicy {
    /// Fail with [`Error::IndexOutOfRange`]
    #[default]
    Error,
    /// Exclude the offending cells and log a warning
    Mask,
}

/// Parameters shared by the normalized-difference indices
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexParams {
    pub out_of_range: OutOfRangePolicy,
}

impl IndexParams {
    pub fn lenient() -> Self {
        Self {
            out_of_range: OutOfRangePolicy::Mask,
        }
    }
}

/// Band positions (0-based) within a multi-band image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandLayout {
    pub red: usize,
    pub nir: usize,
}

impl Default for BandLayout {
    /// Four-band aerial imagery: red, green, blue, near-infrared
    fn default() -> Self {
        Self { red: 0, nir: 3 }
    }
}

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// For non-negative inputs the result lies in [-1, 1]. Anything outside that
/// range means the bands were swapped or are not calibrated, and is handled
/// per `params.out_of_range`.
///
/// # Arguments
/// * `band_a` - Numerator positive band
/// * `band_b` - Numerator negative band
pub fn normalized_difference(
    band_a: &MaskedRaster,
    band_b: &MaskedRaster,
    params: &IndexParams,
) -> Result<MaskedRaster> {
    check_same_grid(band_a, band_b)?;

    let index = masked_from_kernel(band_a, |row, col| {
        let a = valid_at(band_a, row, col)?;
        let b = valid_at(band_b, row, col)?;
        let sum = a + b;
        if sum == 0.0 {
            return None;
        }
        Some((a - b) / sum)
    })?;

    let missing = band_a.mask().union(band_b.mask())?.excluded_count();
    debug!(
        valid = index.valid_count(),
        zero_denominator = index.len() - index.valid_count() - missing,
        "computed normalized difference"
    );

    enforce_unit_range(index, params.out_of_range)
}

fn enforce_unit_range(index: MaskedRaster, policy: OutOfRangePolicy) -> Result<MaskedRaster> {
    let in_range = |v: f64| (-1.0..=1.0).contains(&v);

    let mut count = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in index.valid_values() {
        if !in_range(v) {
            count += 1;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if count == 0 {
        return Ok(index);
    }

    match policy {
        OutOfRangePolicy::Error => Err(Error::IndexOutOfRange { count, min, max }),
        OutOfRangePolicy::Mask => {
            warn!(count, min, max, "excluding index values outside [-1, 1]");
            masked_from_kernel(&index, |row, col| {
                valid_at(&index, row, col).filter(|&v| in_range(v))
            })
        }
    }
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Values range from -1 to 1:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
pub fn ndvi(nir: &MaskedRaster, red: &MaskedRaster, params: &IndexParams) -> Result<MaskedRaster> {
    normalized_difference(nir, red, params)
}

/// NDVI of a multi-band image, with the bands picked by `layout`.
///
/// Each band is masked on the image's no-data value before the ratio.
pub fn ndvi_from_image(
    image: &MultiBandRaster,
    layout: BandLayout,
    params: &IndexParams,
) -> Result<MaskedRaster> {
    let red = image.band_masked(layout.red)?;
    let nir = image.band_masked(layout.nir)?;
    debug!(red = layout.red, nir = layout.nir, "selected NDVI bands");
    ndvi(&nir, &red, params)
}

/// Normalized Difference Water Index (McFeeters, 1996)
///
/// `NDWI = (Green - NIR) / (Green + NIR)`
///
/// Positive values indicate water bodies.
pub fn ndwi(green: &MaskedRaster, nir: &MaskedRaster, params: &IndexParams) -> Result<MaskedRaster> {
    normalized_difference(green, nir, params)
}

/// Parameters for SAVI
#[derive(Debug, Clone, Copy)]
pub struct SaviParams {
    /// Soil brightness correction factor (0 = high vegetation, 1 = low vegetation)
    /// Default: 0.5
    pub l_factor: f64,
}

impl Default for SaviParams {
    fn default() -> Self {
        Self { l_factor: 0.5 }
    }
}

/// Soil Adjusted Vegetation Index (Huete, 1988)
///
/// `SAVI = ((NIR - Red) / (NIR + Red + L)) * (1 + L)`
///
/// Not a pure normalized difference, so no [-1, 1] check is applied; the
/// zero-denominator guard still is.
pub fn savi(nir: &MaskedRaster, red: &MaskedRaster, params: SaviParams) -> Result<MaskedRaster> {
    let l = params.l_factor;
    if !l.is_finite() || l < 0.0 {
        return Err(Error::InvalidParameter {
            name: "l_factor",
            value: l.to_string(),
            reason: "must be finite and non-negative".into(),
        });
    }
    check_same_grid(nir, red)?;

    masked_from_kernel(nir, |row, col| {
        let n = valid_at(nir, row, col)?;
        let r = valid_at(red, row, col)?;
        let denom = n + r + l;
        if denom == 0.0 {
            return None;
        }
        Some(((n - r) / denom) * (1.0 + l))
    })
}
