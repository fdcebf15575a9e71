//! Read-only description of a raster file

use crate::crs::CRS;
use crate::raster::GeoTransform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric sample type as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    UInt8,
    UInt16,
    UInt32,
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
}

impl DataType {
    /// Map the TIFF SampleFormat (1 = unsigned, 2 = signed, 3 = float) and
    /// BitsPerSample tags to a data type
    pub fn from_tiff(sample_format: u16, bits: u16) -> Option<Self> {
        match (sample_format, bits) {
            (1, 8) => Some(Self::UInt8),
            (1, 16) => Some(Self::UInt16),
            (1, 32) => Some(Self::UInt32),
            (2, 8) => Some(Self::Int8),
            (2, 16) => Some(Self::Int16),
            (2, 32) => Some(Self::Int32),
            (3, 32) => Some(Self::Float32),
            (3, 64) => Some(Self::Float64),
            _ => None,
        }
    }

    /// Round a sentinel to the precision cells of this type are stored at,
    /// so that it compares equal to the widened cells that carry it
    pub fn narrow(&self, value: f64) -> f64 {
        match self {
            Self::Float32 => value as f32 as f64,
            _ => value,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metadata record returned alongside the pixel data of a read.
///
/// Data and metadata are separate values; callers keep them paired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMetadata {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub data_type: DataType,
    /// Declared no-data sentinel (GDAL_NODATA), if any
    pub nodata: Option<f64>,
    pub transform: GeoTransform,
    pub crs: Option<CRS>,
}

impl RasterMetadata {
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl fmt::Display for RasterMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "driver: GTiff")?;
        writeln!(f, "dtype: {}", self.data_type)?;
        match self.nodata {
            Some(nd) => writeln!(f, "nodata: {nd}")?,
            None => writeln!(f, "nodata: None")?,
        }
        writeln!(f, "width: {}", self.width)?;
        writeln!(f, "height: {}", self.height)?;
        writeln!(f, "count: {}", self.band_count)?;
        match &self.crs {
            Some(crs) => writeln!(f, "crs: {crs}")?,
            None => writeln!(f, "crs: None")?,
        }
        write!(f, "transform: {}", self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_from_tiff() {
        assert_eq!(DataType::from_tiff(1, 8), Some(DataType::UInt8));
        assert_eq!(DataType::from_tiff(3, 32), Some(DataType::Float32));
        assert_eq!(DataType::from_tiff(3, 16), None);
    }

    #[test]
    fn test_narrow_to_storage_precision() {
        assert_eq!(DataType::Float32.narrow(-9999.9), -9999.900390625);
        assert_eq!(DataType::Float64.narrow(-9999.9), -9999.9);
        assert_eq!(DataType::Int16.narrow(-9999.0), -9999.0);
        assert!(DataType::Float32.narrow(f64::NAN).is_nan());
    }

    #[test]
    fn test_display_lists_fields() {
        let meta = RasterMetadata {
            width: 4,
            height: 3,
            band_count: 1,
            data_type: DataType::Float32,
            nodata: Some(-9999.0),
            transform: GeoTransform::new(0.0, 3.0, 1.0, -1.0),
            crs: Some(CRS::from_epsg(32613)),
        };
        let text = meta.to_string();
        assert!(text.contains("dtype: float32"));
        assert!(text.contains("nodata: -9999"));
        assert!(text.contains("crs: EPSG:32613"));
        assert_eq!(meta.shape(), (3, 4));
    }
}
