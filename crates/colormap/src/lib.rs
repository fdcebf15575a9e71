//! # GeoLab Colormap
//!
//! Color mapping and PNG rendering for GeoLab rasters.
//!
//! Excluded cells always render transparent, so a masked read or a masked
//! product can be plotted directly. [`masked_to_rgba`] covers continuous
//! values, [`classified_to_rgba`] class labels.
//!
//! ## Usage
//!
//! ```no_run
//! use geolab_colormap::{auto_params, save_masked_png, ColorScheme};
//! use geolab_core::io::read_geotiff_masked;
//!
//! let (dtm, _) = read_geotiff_masked("pre_DTM.tif", None)?;
//! save_masked_png("pre_DTM.png", &dtm, &auto_params(&dtm, ColorScheme::Terrain))?;
//! # Ok::<(), geolab_core::Error>(())
//! ```

mod png;
mod render;
mod scheme;

pub use png::{save_classified_png, save_masked_png, save_png};
pub use render::{auto_params, classified_to_rgba, masked_to_rgba, symmetric_params, ColormapParams};
pub use scheme::{categorical, evaluate, ColorScheme, ColorStop, Rgb};
