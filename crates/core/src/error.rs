//! Error types for GeoLab

use thiserror::Error;

/// Main error type for GeoLab operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("CRS mismatch: {expected} vs {actual}")]
    CrsMismatch { expected: String, actual: String },

    #[error("Band {band} requested but the raster has {count} band(s)")]
    BandOutOfRange { band: usize, count: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A normalized index produced values outside [-1, 1], which points at
    /// swapped bands or uncalibrated input.
    #[error("{count} index value(s) outside [-1, 1] (observed range {min} .. {max})")]
    IndexOutOfRange { count: usize, min: f64, max: f64 },

    #[error("Render error: {0}")]
    Render(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shape mismatch between an `expected` and an `actual` (rows, cols) pair
    pub fn size_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Error::SizeMismatch {
            er: expected.0,
            ec: expected.1,
            ar: actual.0,
            ac: actual.1,
        }
    }
}

/// Result type alias for GeoLab operations
pub type Result<T> = std::result::Result<T, Error>;
