//! Raster element trait for generic cell values

use num_traits::{NumCast, ToPrimitive, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Sample values read from disk are widened to `f64`; integer element types
/// are used for class labels.
pub trait RasterElement:
    Copy + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Check if this value represents no-data.
    ///
    /// Floating point NaN is always no-data; otherwise the value must equal
    /// the declared sentinel exactly.
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        ToPrimitive::to_f64(&self)
    }
}

macro_rules! impl_raster_element {
    (int: $($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    nodata == Some(*self)
                }
            }
        )*
    };
    (float: $($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    self.is_nan() || nodata == Some(*self)
                }
            }
        )*
    };
}

impl_raster_element!(int: i8, i16, i32, u8, u16, u32);
impl_raster_element!(float: f32, f64);
