//! Binning of continuous rasters into class labels
//!
//! Two flavours:
//! - [`reclassify`]: ordered boundaries to integer labels (`digitize`
//!   semantics), producing a [`ClassifiedRaster`]
//! - [`reclassify_table`]: explicit `[min, max)` ranges to arbitrary values

use crate::kernel::{map_cells, masked_from_kernel, valid_at};
use geolab_core::{ClassifiedRaster, Error, MaskedRaster, Result};
use ndarray::Array2;
use tracing::debug;

/// Bin index of `value` against ascending `bins`.
///
/// Returns `i` such that `bins[i - 1] <= value < bins[i]`, `0` below the
/// first boundary and `bins.len()` at or above the last. NaN is not less
/// than any boundary and maps to `bins.len()`.
pub fn digitize(value: f64, bins: &[f64]) -> usize {
    if value.is_nan() {
        return bins.len();
    }
    bins.partition_point(|&b| b <= value)
}

fn validate_bins(bins: &[f64]) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidParameter {
        name: "bins",
        value: format!("{:?}", bins),
        reason: reason.into(),
    };

    if bins.is_empty() {
        return Err(invalid("at least one boundary is required"));
    }
    if bins.len() >= u16::MAX as usize {
        return Err(invalid("too many boundaries"));
    }
    if bins.iter().any(|b| b.is_nan()) {
        return Err(invalid("boundaries must not be NaN"));
    }
    if bins.windows(2).any(|w| w[0] >= w[1]) {
        return Err(invalid("boundaries must be strictly ascending"));
    }
    Ok(())
}

/// Label every valid cell with its bin index.
///
/// Excluded cells stay excluded and carry no label; a valid cell below the
/// first boundary gets label 0, which [`ClassifiedRaster::in_range`] reports
/// as out of range but still has data.
///
/// # Example
/// ```
/// use geolab_algorithms::classification::reclassify;
/// use geolab_core::{MaskedRaster, Raster};
///
/// let mut dtm = Raster::from_vec(vec![-9999.0, 1000.0, 1004.0, 1006.0], 2, 2)?;
/// dtm.set_nodata(Some(-9999.0));
/// let classes = reclassify(&MaskedRaster::from_raster(dtm), &[1000.0, 1005.0, f64::INFINITY])?;
///
/// assert_eq!(classes.label(0, 0)?, None);
/// assert_eq!(classes.label(0, 1)?, Some(1));
/// assert_eq!(classes.label(1, 1)?, Some(2));
/// # Ok::<(), geolab_core::Error>(())
/// ```
pub fn reclassify(raster: &MaskedRaster, bins: &[f64]) -> Result<ClassifiedRaster> {
    validate_bins(bins)?;

    let (rows, cols) = raster.shape();
    let labels: Vec<u16> = map_cells(rows, cols, |row, col| {
        valid_at(raster, row, col).map_or(0, |v| digitize(v, bins) as u16)
    });

    let labels = Array2::from_shape_vec((rows, cols), labels)
        .map_err(|e| Error::Other(e.to_string()))?;
    let labels = raster.raster().with_same_meta(labels)?;
    let classified = ClassifiedRaster::new(labels, raster.mask().clone(), bins.len())?;

    debug!(
        boundaries = bins.len(),
        classes = ?classified.unique_labels(),
        "reclassified raster"
    );
    Ok(classified)
}

/// A reclassification entry mapping an input range to an output value
#[derive(Debug, Clone, PartialEq)]
pub struct ReclassEntry {
    /// Minimum value (inclusive)
    pub min: f64,
    /// Maximum value (exclusive, except for the last entry)
    pub max: f64,
    /// Output value for this range
    pub value: f64,
}

impl ReclassEntry {
    pub fn new(min: f64, max: f64, value: f64) -> Self {
        Self { min, max, value }
    }

    fn contains(&self, v: f64) -> bool {
        v >= self.min && v < self.max
    }
}

/// Table for [`reclassify_table`]
#[derive(Debug, Clone)]
pub struct ReclassifyParams {
    /// Ranges, checked in order; the first match wins
    pub classes: Vec<ReclassEntry>,
    /// Output for valid cells matching no range. NaN excludes them.
    pub default_value: f64,
}

impl Default for ReclassifyParams {
    fn default() -> Self {
        Self {
            classes: Vec::new(),
            default_value: f64::NAN,
        }
    }
}

/// Map valid cells through a range table.
///
/// The last entry also accepts a value equal to its `max`, so a table ending
/// at the data maximum covers it.
pub fn reclassify_table(raster: &MaskedRaster, params: &ReclassifyParams) -> Result<MaskedRaster> {
    let classes = &params.classes;
    let last = classes.last();

    masked_from_kernel(raster, |row, col| {
        let v = valid_at(raster, row, col)?;
        let matched = classes
            .iter()
            .find(|entry| entry.contains(v))
            .or_else(|| last.filter(|entry| v == entry.max));
        Some(matched.map_or(params.default_value, |entry| entry.value))
    })
}
