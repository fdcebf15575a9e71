//! Imagery analysis algorithms
//!
//! Algorithms for multispectral imagery:
//! - Spectral indices: NDVI, NDWI, SAVI over masked bands
//! - Normalized difference: generic two-band index with a [-1, 1] check
//! - Change detection: temporal differencing and change categories

mod change_detection;
mod indices;

pub use change_detection::{
    classify_change, index_difference, ChangeThresholds, CHANGE_DECREASE, CHANGE_INCREASE,
    CHANGE_NO_CHANGE,
};
pub use indices::{
    ndvi, ndvi_from_image, ndwi, normalized_difference, savi, BandLayout, IndexParams,
    OutOfRangePolicy, SaviParams,
};
