//! # GeoLab Algorithms
//!
//! Raster algorithms for the GeoLab pipelines.
//!
//! ## Available Algorithm Categories
//!
//! - **elevation**: Unit conversion of elevation models
//! - **classification**: Binning into class labels, keep-masks, mask application
//! - **imagery**: Normalized-difference indices, temporal change detection
//!
//! Every function takes masked inputs and returns a new value; cells excluded
//! in an input stay excluded in the output.

mod kernel;
mod maybe_rayon;

pub mod classification;
pub mod elevation;
pub mod imagery;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classification::{
        apply_mask, class_mask, digitize, reclassify, reclassify_table, threshold_mask,
        BinaryMask, Comparison, ReclassEntry, ReclassifyParams,
    };
    pub use crate::elevation::{convert_units, LinearUnit, METERS_TO_FEET};
    pub use crate::imagery::{
        classify_change, index_difference, ndvi, ndvi_from_image, ndwi, normalized_difference,
        savi, BandLayout, ChangeThresholds, IndexParams, OutOfRangePolicy, SaviParams,
    };
    pub use geolab_core::prelude::*;
}
