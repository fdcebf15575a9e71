//! Linear unit conversion of elevation values

use crate::kernel::{masked_from_kernel, valid_at};
use geolab_core::{Error, MaskedRaster, Result};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// International foot per meter
pub const METERS_TO_FEET: f64 = 3.28084;

/// Vertical units an elevation model may be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearUnit {
    Meters,
    Feet,
}

impl LinearUnit {
    /// Multiplier converting a value in `self` into `target`
    pub fn factor_to(self, target: LinearUnit) -> f64 {
        match (self, target) {
            (LinearUnit::Meters, LinearUnit::Feet) => METERS_TO_FEET,
            (LinearUnit::Feet, LinearUnit::Meters) => 1.0 / METERS_TO_FEET,
            _ => 1.0,
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            LinearUnit::Meters => "m",
            LinearUnit::Feet => "ft",
        }
    }
}

impl fmt::Display for LinearUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for LinearUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(LinearUnit::Meters),
            "ft" | "foot" | "feet" => Ok(LinearUnit::Feet),
            _ => Err(Error::InvalidParameter {
                name: "unit",
                value: s.to_string(),
                reason: "expected meters (m) or feet (ft)".into(),
            }),
        }
    }
}

/// Multiply every valid cell by `factor`.
///
/// Excluded cells stay excluded and are never multiplied. A product that
/// overflows to infinity is excluded as well, so a sentinel that slipped
/// through unmasked cannot turn into a spurious finite value.
///
/// # Example
/// ```
/// use geolab_algorithms::elevation::{convert_units, METERS_TO_FEET};
/// use geolab_core::{MaskedRaster, Raster};
///
/// let mut dtm = Raster::from_vec(vec![-9999.0, 1000.0], 1, 2)?;
/// dtm.set_nodata(Some(-9999.0));
/// let feet = convert_units(&MaskedRaster::from_raster(dtm), METERS_TO_FEET)?;
///
/// assert_eq!(feet.get(0, 0)?, None);
/// assert_eq!(feet.get(0, 1)?, Some(1000.0 * METERS_TO_FEET));
/// # Ok::<(), geolab_core::Error>(())
/// ```
pub fn convert_units(raster: &MaskedRaster, factor: f64) -> Result<MaskedRaster> {
    if !factor.is_finite() || factor == 0.0 {
        return Err(Error::InvalidParameter {
            name: "factor",
            value: factor.to_string(),
            reason: "must be finite and non-zero".into(),
        });
    }

    let out = masked_from_kernel(raster, |row, col| {
        valid_at(raster, row, col).map(|v| v * factor)
    })?;

    debug!(
        factor,
        valid = out.valid_count(),
        newly_excluded = raster.valid_count().saturating_sub(out.valid_count()),
        "converted units"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geolab_core::Raster;

    fn dtm() -> MaskedRaster {
        let mut raster = Raster::from_vec(vec![-9999.0, 1000.0, 1008.0, 0.0], 2, 2).unwrap();
        raster.set_nodata(Some(-9999.0));
        MaskedRaster::from_raster(raster)
    }

    #[test]
    fn test_meters_to_feet() {
        let feet = convert_units(&dtm(), METERS_TO_FEET).unwrap();
        assert_relative_eq!(feet.get(0, 1).unwrap().unwrap(), 3280.84, epsilon = 1e-9);
        assert_relative_eq!(
            feet.statistics().max.unwrap(),
            1008.0 * METERS_TO_FEET,
            epsilon = 1e-9
        );
        assert_eq!(feet.get(1, 1).unwrap(), Some(0.0));
    }

    #[test]
    fn test_mask_is_preserved() {
        let feet = convert_units(&dtm(), METERS_TO_FEET).unwrap();
        assert!(feet.is_excluded(0, 0));
        assert_eq!(feet.valid_count(), 3);
        assert_eq!(feet.statistics().min, Some(0.0));
    }

    #[test]
    fn test_overflow_is_excluded() {
        let raster = Raster::from_vec(vec![f64::MAX, 1.0], 1, 2).unwrap();
        let out = convert_units(&MaskedRaster::unmasked(raster), 10.0).unwrap();
        assert!(out.is_excluded(0, 0));
        assert_eq!(out.get(0, 1).unwrap(), Some(10.0));
    }

    #[test]
    fn test_linear() {
        let once = convert_units(&dtm(), 2.0).unwrap();
        let twice = convert_units(&once, 2.0).unwrap();
        let direct = convert_units(&dtm(), 4.0).unwrap();
        for (a, b) in twice.valid_values().zip(direct.valid_values()) {
            assert_relative_eq!(a, b);
        }
    }

    #[test]
    fn test_invalid_factor() {
        assert!(convert_units(&dtm(), 0.0).is_err());
        assert!(convert_units(&dtm(), f64::NAN).is_err());
    }

    #[test]
    fn test_unit_factors() {
        assert_eq!(LinearUnit::Meters.factor_to(LinearUnit::Feet), METERS_TO_FEET);
        assert_relative_eq!(
            LinearUnit::Feet.factor_to(LinearUnit::Meters) * METERS_TO_FEET,
            1.0
        );
        assert_eq!(LinearUnit::Feet.factor_to(LinearUnit::Feet), 1.0);
        assert_eq!(LinearUnit::Feet.to_string(), "ft");
    }

    #[test]
    fn test_unit_names() {
        assert_eq!("m".parse::<LinearUnit>().unwrap(), LinearUnit::Meters);
        assert_eq!("Feet".parse::<LinearUnit>().unwrap(), LinearUnit::Feet);
        assert!(matches!(
            "yards".parse::<LinearUnit>(),
            Err(Error::InvalidParameter { name: "unit", .. })
        ));
    }
}
