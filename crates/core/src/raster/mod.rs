//! Raster data structures and operations

mod classified;
mod element;
mod geotransform;
mod grid;
mod mask;
mod masked;
mod multiband;

pub use classified::ClassifiedRaster;
pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use mask::Mask;
pub use masked::{Histogram, MaskedRaster, MaskedStatistics};
pub use multiband::MultiBandRaster;
