//! # GeoLab Core
//!
//! Core types and I/O for the GeoLab raster toolkit.
//!
//! This crate provides:
//! - `Raster<T>`: generic georeferenced 2D grid with a no-data sentinel
//! - `MaskedRaster`: a raster paired with an explicit exclusion mask
//! - `ClassifiedRaster`: integer labels with independent has-data tracking
//! - `MultiBandRaster`: co-registered band stacks
//! - `RasterMetadata`, `GeoTransform`, `CRS`: the metadata surface of a file
//! - Scoped GeoTIFF reading (`io::RasterSource`, `io::with_raster`) and writing

pub mod crs;
pub mod error;
pub mod io;
pub mod metadata;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use metadata::{DataType, RasterMetadata};
pub use raster::{
    ClassifiedRaster, GeoTransform, Mask, MaskedRaster, MultiBandRaster, Raster, RasterElement,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::metadata::RasterMetadata;
    pub use crate::raster::{
        ClassifiedRaster, GeoTransform, Mask, MaskedRaster, MultiBandRaster, Raster,
        RasterElement,
    };
}
