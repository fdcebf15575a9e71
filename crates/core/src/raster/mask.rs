//! Per-cell exclusion mask

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement};
use ndarray::{Array2, Zip};

/// Boolean exclusion set over a grid: `true` marks a cell that carries no
/// valid data and must be ignored by arithmetic and reductions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    excluded: Array2<bool>,
}

impl Mask {
    /// Mask with no excluded cells
    pub fn none(rows: usize, cols: usize) -> Self {
        Self {
            excluded: Array2::from_elem((rows, cols), false),
        }
    }

    /// Mask excluding every cell
    pub fn all(rows: usize, cols: usize) -> Self {
        Self {
            excluded: Array2::from_elem((rows, cols), true),
        }
    }

    pub fn from_array(excluded: Array2<bool>) -> Self {
        Self { excluded }
    }

    /// Exclude every cell equal to the raster's no-data value, plus NaN cells
    pub fn from_nodata<T: RasterElement>(raster: &Raster<T>) -> Self {
        let nodata = raster.nodata();
        Self {
            excluded: raster.data().mapv(|v| v.is_nodata(nodata)),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.excluded.dim()
    }

    /// Whether (row, col) is excluded. Out-of-bounds cells count as excluded.
    pub fn is_excluded(&self, row: usize, col: usize) -> bool {
        self.excluded.get((row, col)).copied().unwrap_or(true)
    }

    pub fn exclude(&mut self, row: usize, col: usize) -> Result<()> {
        let (rows, cols) = self.shape();
        match self.excluded.get_mut((row, col)) {
            Some(cell) => {
                *cell = true;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds { row, col, rows, cols }),
        }
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.iter().filter(|&&e| e).count()
    }

    pub fn valid_count(&self) -> usize {
        self.excluded.len() - self.excluded_count()
    }

    /// Cells excluded in either mask
    pub fn union(&self, other: &Mask) -> Result<Mask> {
        if self.shape() != other.shape() {
            return Err(Error::size_mismatch(self.shape(), other.shape()));
        }
        let excluded = Zip::from(&self.excluded)
            .and(&other.excluded)
            .map_collect(|&a, &b| a || b);
        Ok(Mask { excluded })
    }

    pub fn as_array(&self) -> &Array2<bool> {
        &self.excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_nodata() {
        let mut raster = Raster::from_vec(vec![-9999.0, 1.0, 2.0, f64::NAN], 2, 2).unwrap();
        raster.set_nodata(Some(-9999.0));
        let mask = Mask::from_nodata(&raster);

        assert!(mask.is_excluded(0, 0));
        assert!(!mask.is_excluded(0, 1));
        assert!(mask.is_excluded(1, 1));
        assert_eq!(mask.excluded_count(), 2);
        assert_eq!(mask.valid_count(), 2);
    }

    #[test]
    fn test_union() {
        let mut a = Mask::none(2, 2);
        a.exclude(0, 0).unwrap();
        let mut b = Mask::none(2, 2);
        b.exclude(1, 1).unwrap();

        let u = a.union(&b).unwrap();
        assert!(u.is_excluded(0, 0) && u.is_excluded(1, 1));
        assert!(!u.is_excluded(0, 1));

        assert!(a.union(&Mask::none(3, 2)).is_err());
    }

    #[test]
    fn test_out_of_bounds_is_excluded() {
        let mask = Mask::none(1, 1);
        assert!(mask.is_excluded(5, 5));
    }
}
