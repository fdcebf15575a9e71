//! Classification of continuous rasters
//!
//! - Reclassify: boundary binning into labels, or range-table remapping
//! - Masks: keep-masks from class labels or thresholds, and their application

mod mask;
mod reclassify;

pub use mask::{apply_mask, class_mask, threshold_mask, BinaryMask, Comparison};
pub use reclassify::{digitize, reclassify, reclassify_table, ReclassEntry, ReclassifyParams};
