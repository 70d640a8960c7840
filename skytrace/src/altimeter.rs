//! Barometric pressure to altitude conversion.
//!
//! Uses the ICAO standard atmosphere model for the troposphere. Pressure
//! samples are converted to pressure altitude before entering the
//! barometric altitude filter; the absolute offset from true MSL altitude
//! cancels out because only the rate of change is consumed downstream.

/// Standard sea-level pressure in pascals.
const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Barometric exponent (R * L / (g * M)) for the standard atmosphere.
const PRESSURE_EXPONENT: f64 = 0.190_263;

/// Scale height term T0 / L in meters.
const ALTITUDE_SCALE_M: f64 = 44_330.77;

/// Convert static pressure in pascals to pressure altitude in meters.
pub fn pressure_to_altitude(pressure_pa: f64) -> f64 {
    ALTITUDE_SCALE_M * (1.0 - (pressure_pa / SEA_LEVEL_PRESSURE_PA).powf(PRESSURE_EXPONENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sea_level_is_zero() {
        assert!(pressure_to_altitude(SEA_LEVEL_PRESSURE_PA).abs() < 1e-9);
    }

    #[test]
    fn test_standard_pressure_levels() {
        // ~1500 m at 84.6 kPa, within standard atmosphere tolerance
        let alt = pressure_to_altitude(84_600.0);
        assert!((alt - 1500.0).abs() < 20.0, "got {alt}");

        // Lower pressure means higher altitude
        assert!(pressure_to_altitude(70_000.0) > pressure_to_altitude(90_000.0));
    }
}
