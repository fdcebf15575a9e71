//! Per-cell kernel drivers shared by the algorithms.
//!
//! Rows are evaluated independently (in parallel with the `parallel`
//! feature) and concatenated in row-major order.

use crate::maybe_rayon::*;
use geolab_core::{Error, MaskedRaster, Result};

/// Evaluate `f(row, col)` for every cell, row-major
pub(crate) fn map_cells<T, F>(rows: usize, cols: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, usize) -> T + Sync + Send,
{
    (0..rows)
        .into_par_iter()
        .flat_map(|row| (0..cols).map(|col| f(row, col)).collect::<Vec<_>>())
        .collect()
}

/// Value of a cell, `None` when excluded
#[inline]
pub(crate) fn valid_at(raster: &MaskedRaster, row: usize, col: usize) -> Option<f64> {
    if raster.mask().as_array()[[row, col]] {
        None
    } else {
        Some(raster.raster().data()[[row, col]])
    }
}

/// Build a masked raster on the grid of `template` from per-cell results.
/// `None` cells and non-finite values come out excluded.
pub(crate) fn masked_from_kernel<F>(template: &MaskedRaster, f: F) -> Result<MaskedRaster>
where
    F: Fn(usize, usize) -> Option<f64> + Sync + Send,
{
    let (rows, cols) = template.shape();
    let cells = map_cells(rows, cols, f);
    let excluded = cells.iter().map(Option::is_none).collect();
    let values = cells.into_iter().map(|c| c.unwrap_or(f64::NAN)).collect();
    MaskedRaster::from_cells(template.raster(), values, excluded)
}

/// Co-registration precondition for elementwise binary operators: same
/// shape, and the same CRS when both sides declare one
pub(crate) fn check_same_grid(a: &MaskedRaster, b: &MaskedRaster) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::size_mismatch(a.shape(), b.shape()));
    }
    if let (Some(ca), Some(cb)) = (a.raster().crs(), b.raster().crs()) {
        if ca != cb {
            return Err(Error::CrsMismatch {
                expected: ca.to_string(),
                actual: cb.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolab_core::{Mask, Raster, CRS};

    #[test]
    fn cells_are_row_major() {
        let out = map_cells(2, 3, |r, c| r * 10 + c);
        assert_eq!(out, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn kernel_excludes_none_and_non_finite() {
        let raster = Raster::filled(1, 3, 2.0);
        let template = MaskedRaster::unmasked(raster);
        let out = masked_from_kernel(&template, |_, col| match col {
            0 => Some(1.0),
            1 => None,
            _ => Some(f64::INFINITY),
        })
        .unwrap();

        assert_eq!(out.get(0, 0).unwrap(), Some(1.0));
        assert!(out.is_excluded(0, 1));
        assert!(out.is_excluded(0, 2));
    }

    #[test]
    fn shape_check() {
        let a = MaskedRaster::unmasked(Raster::<f64>::new(2, 2));
        let b = MaskedRaster::new(Raster::<f64>::new(2, 3), Mask::none(2, 3)).unwrap();
        assert!(matches!(check_same_grid(&a, &b), Err(Error::SizeMismatch { .. })));
        assert!(check_same_grid(&a, &a).is_ok());
    }

    #[test]
    fn crs_check() {
        let with_crs = |code| {
            let mut raster = Raster::<f64>::new(2, 2);
            raster.set_crs(Some(CRS::from_epsg(code)));
            MaskedRaster::unmasked(raster)
        };
        let bare = MaskedRaster::unmasked(Raster::<f64>::new(2, 2));

        assert!(matches!(
            check_same_grid(&with_crs(32613), &with_crs(4326)),
            Err(Error::CrsMismatch { .. })
        ));
        assert!(check_same_grid(&with_crs(32613), &with_crs(32613)).is_ok());
        assert!(check_same_grid(&with_crs(32613), &bare).is_ok());
    }
}
