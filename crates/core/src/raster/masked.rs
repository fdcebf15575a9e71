//! Raster paired with an exclusion mask

use crate::error::{Error, Result};
use crate::raster::{Mask, Raster, RasterElement};
use ndarray::{Array2, Zip};

/// A `Raster<f64>` together with the set of cells that carry no data.
///
/// Every reduction on a masked raster (`statistics`, `histogram`,
/// `valid_values`) skips excluded cells. The stored value of an excluded cell
/// is whatever the source held (the sentinel for a masked read, NaN for a
/// computed raster) and must not be interpreted.
#[derive(Debug, Clone)]
pub struct MaskedRaster {
    raster: Raster<f64>,
    mask: Mask,
}

/// Summary of the valid cells of a masked raster
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub excluded_count: usize,
}

/// Equal-width histogram over the valid cells.
///
/// `edges` has one more entry than `counts`; every bin is half-open except
/// the last, which includes the upper edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl MaskedRaster {
    /// Pair a raster with an explicit mask of the same shape
    pub fn new(raster: Raster<f64>, mask: Mask) -> Result<Self> {
        if raster.shape() != mask.shape() {
            return Err(Error::size_mismatch(raster.shape(), mask.shape()));
        }
        Ok(Self { raster, mask })
    }

    /// Mask every cell equal to the raster's declared no-data value (and NaN)
    pub fn from_raster(raster: Raster<f64>) -> Self {
        let mask = Mask::from_nodata(&raster);
        Self { raster, mask }
    }

    /// Wrap a raster without excluding anything, not even its sentinel
    pub fn unmasked(raster: Raster<f64>) -> Self {
        let (rows, cols) = raster.shape();
        Self {
            raster,
            mask: Mask::none(rows, cols),
        }
    }

    /// Build a computed raster on the grid of `template`.
    ///
    /// `values` and `excluded` are row-major. A cell is excluded when flagged
    /// or when its value is not finite; excluded cells are stored as NaN and
    /// the output's no-data value is NaN.
    pub fn from_cells<T: RasterElement>(
        template: &Raster<T>,
        values: Vec<f64>,
        excluded: Vec<bool>,
    ) -> Result<Self> {
        let (rows, cols) = template.shape();
        if values.len() != rows * cols || excluded.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let mut data = Array2::from_shape_vec((rows, cols), values)
            .map_err(|e| Error::Other(e.to_string()))?;
        let mut excluded = Array2::from_shape_vec((rows, cols), excluded)
            .map_err(|e| Error::Other(e.to_string()))?;

        Zip::from(&mut data).and(&mut excluded).for_each(|v, e| {
            if *e || !v.is_finite() {
                *e = true;
                *v = f64::NAN;
            }
        });

        let mut raster = template.with_same_meta(data)?;
        raster.set_nodata(Some(f64::NAN));
        Ok(Self {
            raster,
            mask: Mask::from_array(excluded),
        })
    }

    pub fn raster(&self) -> &Raster<f64> {
        &self.raster
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }

    pub fn rows(&self) -> usize {
        self.raster.rows()
    }

    pub fn cols(&self) -> usize {
        self.raster.cols()
    }

    pub fn len(&self) -> usize {
        self.raster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raster.is_empty()
    }

    pub fn nodata(&self) -> Option<f64> {
        self.raster.nodata()
    }

    /// Value at (row, col), `None` when the cell is excluded
    pub fn get(&self, row: usize, col: usize) -> Result<Option<f64>> {
        let value = self.raster.get(row, col)?;
        Ok((!self.mask.is_excluded(row, col)).then_some(value))
    }

    pub fn is_excluded(&self, row: usize, col: usize) -> bool {
        self.mask.is_excluded(row, col)
    }

    /// Iterate the values of valid cells in row-major order
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.raster
            .data()
            .iter()
            .zip(self.mask.as_array().iter())
            .filter(|(_, &excluded)| !excluded)
            .map(|(&v, _)| v)
    }

    pub fn valid_count(&self) -> usize {
        self.mask.valid_count()
    }

    /// Min, max and mean over valid cells
    pub fn statistics(&self) -> MaskedStatistics {
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for v in self.valid_values() {
            min = Some(min.map_or(v, |m| m.min(v)));
            max = Some(max.map_or(v, |m| m.max(v)));
            sum += v;
            count += 1;
        }

        MaskedStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            excluded_count: self.len() - count,
        }
    }

    /// Equal-width histogram of the valid cells.
    ///
    /// Returns `Ok(None)` when no cell is valid. A constant raster gets the
    /// range `[v - 0.5, v + 0.5]`.
    pub fn histogram(&self, bins: usize) -> Result<Option<Histogram>> {
        if bins == 0 {
            return Err(Error::InvalidParameter {
                name: "bins",
                value: bins.to_string(),
                reason: "must be at least 1".into(),
            });
        }

        let stats = self.statistics();
        let (Some(mut lo), Some(mut hi)) = (stats.min, stats.max) else {
            return Ok(None);
        };
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for v in self.valid_values() {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Some(Histogram { edges, counts }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn elevation() -> MaskedRaster {
        let values = vec![
            -9999.0, 1001.0, 1002.0,
            1003.0, 1004.0, 1005.0,
            1006.0, 1007.0, 1008.0,
        ];
        let mut raster = Raster::from_vec(values, 3, 3).unwrap();
        raster.set_nodata(Some(-9999.0));
        MaskedRaster::from_raster(raster)
    }

    #[test]
    fn test_statistics_skip_excluded() {
        let stats = elevation().statistics();
        assert_eq!(stats.min, Some(1001.0));
        assert_eq!(stats.max, Some(1008.0));
        assert_relative_eq!(stats.mean.unwrap(), 1004.5);
        assert_eq!(stats.valid_count, 8);
        assert_eq!(stats.excluded_count, 1);
    }

    #[test]
    fn test_unmasked_keeps_sentinel() {
        let raster = elevation().raster().clone();
        let stats = MaskedRaster::unmasked(raster).statistics();
        assert_eq!(stats.min, Some(-9999.0));
    }

    #[test]
    fn test_get_excluded_is_none() {
        let masked = elevation();
        assert_eq!(masked.get(0, 0).unwrap(), None);
        assert_eq!(masked.get(2, 2).unwrap(), Some(1008.0));
        assert!(masked.get(3, 0).is_err());
    }

    #[test]
    fn test_mask_shape_must_match() {
        let raster = Raster::<f64>::new(2, 2);
        assert!(matches!(
            MaskedRaster::new(raster, Mask::none(2, 3)),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_cells_excludes_non_finite() {
        let template = Raster::<f64>::new(1, 4);
        let masked = MaskedRaster::from_cells(
            &template,
            vec![1.0, f64::NEG_INFINITY, f64::NAN, 4.0],
            vec![false, false, false, true],
        )
        .unwrap();

        assert_eq!(masked.get(0, 0).unwrap(), Some(1.0));
        assert!(masked.is_excluded(0, 1));
        assert!(masked.is_excluded(0, 2));
        assert!(masked.is_excluded(0, 3));
        assert!(masked.raster().get(0, 3).unwrap().is_nan());
        assert!(masked.nodata().unwrap().is_nan());
    }

    #[test]
    fn test_histogram() {
        let hist = elevation().histogram(2).unwrap().unwrap();
        assert_eq!(hist.edges.len(), 3);
        assert_relative_eq!(hist.edges[0], 1001.0);
        assert_relative_eq!(hist.edges[2], 1008.0);
        // 1001..1004 below 1004.5, 1005..1008 at or above
        assert_eq!(hist.counts, vec![4, 4]);
        assert_eq!(hist.counts.iter().sum::<usize>(), 8);
    }

    #[test]
    fn test_histogram_all_excluded() {
        let raster = Raster::<f64>::new(2, 2);
        let masked = MaskedRaster::new(raster, Mask::all(2, 2)).unwrap();
        assert!(masked.histogram(4).unwrap().is_none());
        assert!(masked.histogram(0).is_err());
    }
}
