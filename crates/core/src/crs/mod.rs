//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System identified by its EPSG code, as carried in
/// the GeoTIFF GeoKey directory.
///
/// Two rasters are only combined cell by cell when their CRS agree; nothing
/// is ever reprojected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CRS {
    epsg: u32,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self { epsg: code }
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crs_epsg() {
        let crs = CRS::from_epsg(32613);
        assert_eq!(crs.epsg(), 32613);
        assert_eq!(crs.to_string(), "EPSG:32613");
        assert_ne!(crs, CRS::from_epsg(4326));
    }
}
