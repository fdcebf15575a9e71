//! Change detection between two co-registered index rasters
//!
//! - Difference: `after - before`, excluded wherever either date is excluded
//! - Categorical change: decrease / no change / increase by thresholds

use crate::kernel::{check_same_grid, map_cells, masked_from_kernel, valid_at};
use geolab_core::{ClassifiedRaster, Error, MaskedRaster, Result};
use ndarray::Array2;
use tracing::debug;

/// Thresholds for classifying a difference raster
#[derive(Debug, Clone, Copy)]
pub struct ChangeThresholds {
    /// Differences below this are a significant decrease
    pub decrease_threshold: f64,
    /// Differences above this are a significant increase
    pub increase_threshold: f64,
}

impl Default for ChangeThresholds {
    /// ±0.1, a common cut for NDVI differences
    fn default() -> Self {
        Self {
            decrease_threshold: -0.1,
            increase_threshold: 0.1,
        }
    }
}

/// Change categories from [`classify_change`]
pub const CHANGE_DECREASE: u16 = 1;
pub const CHANGE_NO_CHANGE: u16 = 2;
pub const CHANGE_INCREASE: u16 = 3;

/// Boundary count reported by change rasters, so labels 1..=3 are in range
const CHANGE_BOUNDARIES: usize = 4;

/// Temporal difference of two index rasters, `after - before`.
///
/// Both inputs must share a grid and, when declared, a CRS; no resampling
/// or reprojection is attempted.
///
/// # Arguments
/// * `before` - Index at time T1
/// * `after` - Index at time T2
pub fn index_difference(before: &MaskedRaster, after: &MaskedRaster) -> Result<MaskedRaster> {
    check_same_grid(before, after)?;

    let diff = masked_from_kernel(before, |row, col| {
        let b = valid_at(before, row, col)?;
        let a = valid_at(after, row, col)?;
        Some(a - b)
    })?;

    debug!(valid = diff.valid_count(), "computed index difference");
    Ok(diff)
}

/// Classify a difference raster into change categories.
///
/// Output labels:
/// - 1 = Significant decrease (diff < decrease_threshold)
/// - 2 = No significant change
/// - 3 = Significant increase (diff > increase_threshold)
///
/// Excluded cells stay excluded.
pub fn classify_change(diff: &MaskedRaster, thresholds: ChangeThresholds) -> Result<ClassifiedRaster> {
    let ChangeThresholds {
        decrease_threshold: dec,
        increase_threshold: inc,
    } = thresholds;
    if dec.is_nan() || inc.is_nan() || dec > inc {
        return Err(Error::InvalidParameter {
            name: "thresholds",
            value: format!("{} .. {}", dec, inc),
            reason: "decrease threshold must not exceed increase threshold".into(),
        });
    }

    let (rows, cols) = diff.shape();
    let labels: Vec<u16> = map_cells(rows, cols, |row, col| match valid_at(diff, row, col) {
        Some(d) if d < dec => CHANGE_DECREASE,
        Some(d) if d > inc => CHANGE_INCREASE,
        Some(_) => CHANGE_NO_CHANGE,
        None => 0,
    });

    let labels = Array2::from_shape_vec((rows, cols), labels)
        .map_err(|e| Error::Other(e.to_string()))?;
    let labels = diff.raster().with_same_meta(labels)?;
    let classes = ClassifiedRaster::new(labels, diff.mask().clone(), CHANGE_BOUNDARIES)?;

    debug!(counts = ?classes.class_counts(), "classified change");
    Ok(classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geolab_core::Raster;

    fn index(values: Vec<f64>) -> MaskedRaster {
        let cols = values.len();
        MaskedRaster::from_raster(Raster::from_vec(values, 1, cols).unwrap())
    }

    #[test]
    fn test_difference_is_after_minus_before() {
        let before = index(vec![0.2, 0.5, f64::NAN]);
        let after = index(vec![0.6, 0.1, 0.3]);

        let diff = index_difference(&before, &after).unwrap();
        assert_relative_eq!(diff.get(0, 0).unwrap().unwrap(), 0.4, epsilon = 1e-12);
        assert_relative_eq!(diff.get(0, 1).unwrap().unwrap(), -0.4, epsilon = 1e-12);
        assert!(diff.is_excluded(0, 2));
    }

    #[test]
    fn test_identical_inputs_difference_to_zero() {
        let a = index(vec![-0.3, f64::NAN, 0.0, 0.9]);
        let diff = index_difference(&a, &a).unwrap();

        assert!(diff.valid_values().all(|v| v == 0.0));
        assert!(diff.is_excluded(0, 1));
        assert_eq!(diff.valid_count(), 3);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = index(vec![0.1, 0.2]);
        let b = index(vec![0.1, 0.2, 0.3]);
        assert!(matches!(
            index_difference(&a, &b),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_classify_change() {
        let diff = index(vec![-0.5, -0.1, 0.0, 0.1, 0.4, f64::NAN]);
        let classes = classify_change(&diff, ChangeThresholds::default()).unwrap();

        assert_eq!(classes.label(0, 0).unwrap(), Some(CHANGE_DECREASE));
        assert_eq!(classes.label(0, 1).unwrap(), Some(CHANGE_NO_CHANGE));
        assert_eq!(classes.label(0, 2).unwrap(), Some(CHANGE_NO_CHANGE));
        assert_eq!(classes.label(0, 3).unwrap(), Some(CHANGE_NO_CHANGE));
        assert_eq!(classes.label(0, 4).unwrap(), Some(CHANGE_INCREASE));
        assert_eq!(classes.label(0, 5).unwrap(), None);
        assert!(classes.in_range(0, 4));
    }

    #[test]
    fn test_classify_change_rejects_inverted_thresholds() {
        let diff = index(vec![0.0]);
        let thresholds = ChangeThresholds {
            decrease_threshold: 0.5,
            increase_threshold: -0.5,
        };
        assert!(classify_change(&diff, thresholds).is_err());
    }
}
