//! Multi-band rasters (band, row, col)

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, MaskedRaster, Raster};
use ndarray::{Array3, Axis};

/// A stack of co-registered bands sharing one transform, CRS and no-data
/// value. Bands are addressed by 0-based index.
#[derive(Debug, Clone)]
pub struct MultiBandRaster {
    data: Array3<f64>,
    transform: GeoTransform,
    crs: Option<CRS>,
    nodata: Option<f64>,
}

impl MultiBandRaster {
    pub fn new(data: Array3<f64>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        }
    }

    pub fn band_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// Grid shape of each band as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        let (_, rows, cols) = self.data.dim();
        (rows, cols)
    }

    /// Copy out one band with the stack's georeferencing and no-data value
    pub fn band(&self, index: usize) -> Result<Raster<f64>> {
        if index >= self.band_count() {
            return Err(Error::BandOutOfRange {
                band: index,
                count: self.band_count(),
            });
        }
        let mut raster = Raster::from_array(self.data.index_axis(Axis(0), index).to_owned());
        raster.set_transform(self.transform);
        raster.set_crs(self.crs);
        raster.set_nodata(self.nodata);
        Ok(raster)
    }

    /// One band with its no-data cells excluded
    pub fn band_masked(&self, index: usize) -> Result<MaskedRaster> {
        self.band(index).map(MaskedRaster::from_raster)
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<f64>) {
        self.nodata = nodata;
    }
}
