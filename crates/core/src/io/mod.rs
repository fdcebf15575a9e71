//! I/O operations for reading and writing GeoTIFF rasters
//!
//! Native decoding through the `tiff` crate; no GDAL dependency.

mod reader;
mod tags;
mod writer;

pub use reader::{
    read_geotiff, read_geotiff_bands, read_geotiff_from_buffer, read_geotiff_masked, with_raster,
    RasterSource,
};
pub use writer::{write_geotiff, write_geotiff_to_buffer};
