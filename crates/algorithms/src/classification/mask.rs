//! Binary keep-masks and their application

use crate::kernel::{check_same_grid, map_cells, masked_from_kernel, valid_at};
use geolab_core::{ClassifiedRaster, Error, MaskedRaster, Raster, RasterElement, Result};
use tracing::debug;

/// A raster whose valid cells are all exactly `1.0`.
///
/// Kept cells are valid, every other cell is excluded. Applying the mask to
/// a raster multiplies by 1 where kept and propagates the exclusion elsewhere.
#[derive(Debug, Clone)]
pub struct BinaryMask {
    inner: MaskedRaster,
}

impl BinaryMask {
    fn from_keep<T: RasterElement>(template: &Raster<T>, keep: Vec<bool>) -> Result<Self> {
        let values = keep.iter().map(|&k| if k { 1.0 } else { f64::NAN }).collect();
        let excluded = keep.iter().map(|&k| !k).collect();
        let inner = MaskedRaster::from_cells(template, values, excluded)?;
        Ok(Self { inner })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.inner.shape()
    }

    pub fn is_kept(&self, row: usize, col: usize) -> bool {
        !self.inner.is_excluded(row, col)
    }

    pub fn kept_count(&self) -> usize {
        self.inner.valid_count()
    }

    /// The mask as a masked raster of ones
    pub fn as_masked(&self) -> &MaskedRaster {
        &self.inner
    }
}

/// Comparison used by [`threshold_mask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparison {
    pub fn test(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Less => value < threshold,
            Comparison::LessOrEqual => value <= threshold,
            Comparison::Greater => value > threshold,
            Comparison::GreaterOrEqual => value >= threshold,
        }
    }
}

/// Keep the cells labelled `label`; cells without data are never kept
pub fn class_mask(classes: &ClassifiedRaster, label: u16) -> Result<BinaryMask> {
    let (rows, cols) = classes.shape();
    let labels = classes.labels().data();
    let excluded = classes.mask().as_array();

    let keep = map_cells(rows, cols, |row, col| {
        !excluded[[row, col]] && labels[[row, col]] == label
    });
    let mask = BinaryMask::from_keep(classes.labels(), keep)?;

    debug!(label, kept = mask.kept_count(), "built class mask");
    Ok(mask)
}

/// Keep the valid cells where `value <cmp> threshold` holds
pub fn threshold_mask(
    raster: &MaskedRaster,
    threshold: f64,
    comparison: Comparison,
) -> Result<BinaryMask> {
    if threshold.is_nan() {
        return Err(Error::InvalidParameter {
            name: "threshold",
            value: threshold.to_string(),
            reason: "must be a number".into(),
        });
    }

    let (rows, cols) = raster.shape();
    let keep = map_cells(rows, cols, |row, col| {
        valid_at(raster, row, col).is_some_and(|v| comparison.test(v, threshold))
    });
    let mask = BinaryMask::from_keep(raster.raster(), keep)?;

    debug!(threshold, ?comparison, kept = mask.kept_count(), "built threshold mask");
    Ok(mask)
}

/// Multiply `target` by `mask`.
///
/// A cell is excluded when it is excluded in either input; kept cells keep
/// their exact original value.
pub fn apply_mask(target: &MaskedRaster, mask: &BinaryMask) -> Result<MaskedRaster> {
    check_same_grid(target, mask.as_masked())?;

    let ones = mask.as_masked();
    masked_from_kernel(target, |row, col| {
        let keep = valid_at(ones, row, col)?;
        valid_at(target, row, col).map(|v| v * keep)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::reclassify;

    fn elevation() -> MaskedRaster {
        let values = vec![
            -9999.0, 1000.0, 1001.0,
            1002.0, 1003.0, 1004.0,
            1004.0, 1006.0, 1008.0,
        ];
        let mut raster = Raster::from_vec(values, 3, 3).unwrap();
        raster.set_nodata(Some(-9999.0));
        MaskedRaster::from_raster(raster)
    }

    #[test]
    fn test_class_mask_values() {
        let classes = reclassify(&elevation(), &[1000.0, 1005.0, f64::INFINITY]).unwrap();
        let land = class_mask(&classes, 2).unwrap();

        assert_eq!(land.kept_count(), 2);
        assert!(land.is_kept(2, 1));
        assert!(!land.is_kept(0, 0));
        assert!(!land.is_kept(0, 1));
        assert!(land.as_masked().valid_values().all(|v| v == 1.0));
    }

    #[test]
    fn test_class_mask_never_keeps_missing_cells() {
        // masked cells carry label 0 in storage; asking for class 0 must not pick them up
        let classes = reclassify(&elevation(), &[1001.0, 1005.0]).unwrap();
        let below = class_mask(&classes, 0).unwrap();
        assert_eq!(below.kept_count(), 1);
        assert!(below.is_kept(0, 1));
        assert!(!below.is_kept(0, 0));
    }

    #[test]
    fn test_apply_mask_keeps_exact_values() {
        let dtm = elevation();
        let classes = reclassify(&dtm, &[1000.0, 1005.0, f64::INFINITY]).unwrap();
        let water = class_mask(&classes, 1).unwrap();
        let masked = apply_mask(&dtm, &water).unwrap();

        assert_eq!(masked.get(0, 1).unwrap(), Some(1000.0));
        assert_eq!(masked.get(2, 0).unwrap(), Some(1004.0));
        assert_eq!(masked.get(2, 2).unwrap(), None);
        assert_eq!(masked.get(0, 0).unwrap(), None);
        assert_eq!(masked.valid_count(), 6);
    }

    #[test]
    fn test_apply_mask_idempotent_and_absorbing() {
        let dtm = elevation();
        let high = threshold_mask(&dtm, 1003.0, Comparison::GreaterOrEqual).unwrap();

        let once = apply_mask(&dtm, &high).unwrap();
        let twice = apply_mask(&once, &high).unwrap();
        assert_eq!(
            once.valid_values().collect::<Vec<_>>(),
            twice.valid_values().collect::<Vec<_>>()
        );

        for row in 0..3 {
            for col in 0..3 {
                if !high.is_kept(row, col) {
                    assert!(twice.is_excluded(row, col));
                }
            }
        }
    }

    #[test]
    fn test_threshold_mask() {
        let low = threshold_mask(&elevation(), 1002.0, Comparison::Less).unwrap();
        assert_eq!(low.kept_count(), 2);
        assert!(!low.is_kept(0, 0));

        assert!(Comparison::LessOrEqual.test(1.0, 1.0));
        assert!(!Comparison::Greater.test(1.0, 1.0));
        assert!(threshold_mask(&elevation(), f64::NAN, Comparison::Less).is_err());
    }

    #[test]
    fn test_apply_mask_shape_mismatch() {
        let dtm = elevation();
        let other = MaskedRaster::unmasked(Raster::filled(2, 2, 1.0));
        let mask = threshold_mask(&other, 0.0, Comparison::Greater).unwrap();
        assert!(matches!(apply_mask(&dtm, &mask), Err(Error::SizeMismatch { .. })));
    }
}
