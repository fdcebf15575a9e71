//! Elevation model processing

mod units;

pub use units::{convert_units, LinearUnit, METERS_TO_FEET};
