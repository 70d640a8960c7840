//! Measurement value types shared by the live fusion path and track replay.
//!
//! - [`Measurement`] - fused position/altitude/climb snapshot emitted to listeners
//! - [`GpsFix`] - raw satellite fix as delivered by a positioning collaborator
//! - [`BaroSample`] - raw barometric sensor reading (nanosecond clock)
//!
//! All three are immutable value objects: constructed once, never mutated.

/// A fused point-in-time fix.
///
/// Emitted by the fusion engine on every position-bearing sample and by
/// track replay for every parsed position row. Timestamps are strictly
/// increasing within one source; sources are not synchronized to
/// sub-second precision.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Milliseconds since the unix epoch.
    pub time_millis: u64,

    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,

    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,

    /// Altitude above mean sea level in meters.
    pub altitude_msl: f64,

    /// Vertical speed in m/s, positive up.
    ///
    /// Derived from altitude-over-time, never directly measured.
    /// NaN until the source filter has seen enough samples.
    pub climb_rate: f64,

    /// Northward ground velocity in m/s.
    pub velocity_north: f64,

    /// Eastward ground velocity in m/s.
    pub velocity_east: f64,

    /// Estimated horizontal position error in meters, if the source reported one.
    pub horizontal_accuracy: Option<f32>,

    /// Estimated vertical position error in meters, if the source reported one.
    pub vertical_accuracy: Option<f32>,

    /// Estimated speed error in m/s, if the source reported one.
    pub speed_accuracy: Option<f32>,
}

impl Measurement {
    /// Horizontal ground speed in m/s.
    pub fn ground_speed(&self) -> f64 {
        (self.velocity_north * self.velocity_north + self.velocity_east * self.velocity_east)
            .sqrt()
    }

    /// Total 3D speed in m/s, NaN while climb rate is undefined.
    pub fn total_speed(&self) -> f64 {
        (self.velocity_north * self.velocity_north
            + self.velocity_east * self.velocity_east
            + self.climb_rate * self.climb_rate)
            .sqrt()
    }
}

/// A raw satellite fix from a positioning source (phone API or BLE GPS).
///
/// Fixes always supply latitude/longitude and horizontal velocity; altitude
/// feeds the satellite altitude filter.
#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    /// Milliseconds since the unix epoch.
    pub time_millis: u64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude MSL in meters.
    pub altitude_msl: f64,
    /// Northward velocity in m/s.
    pub velocity_north: f64,
    /// Eastward velocity in m/s.
    pub velocity_east: f64,
    /// Horizontal accuracy estimate in meters.
    pub horizontal_accuracy: Option<f32>,
    /// Vertical accuracy estimate in meters.
    pub vertical_accuracy: Option<f32>,
    /// Speed accuracy estimate in m/s.
    pub speed_accuracy: Option<f32>,
}

impl GpsFix {
    /// Create a fix from velocity components.
    pub fn new(
        time_millis: u64,
        latitude: f64,
        longitude: f64,
        altitude_msl: f64,
        velocity_north: f64,
        velocity_east: f64,
    ) -> Self {
        Self {
            time_millis,
            latitude,
            longitude,
            altitude_msl,
            velocity_north,
            velocity_east,
            horizontal_accuracy: None,
            vertical_accuracy: None,
            speed_accuracy: None,
        }
    }

    /// Create a fix from ground speed and bearing.
    ///
    /// Some sources (NMEA-style devices) report speed over ground plus a
    /// true bearing in degrees instead of velocity components.
    pub fn from_speed_bearing(
        time_millis: u64,
        latitude: f64,
        longitude: f64,
        altitude_msl: f64,
        ground_speed: f64,
        bearing_deg: f64,
    ) -> Self {
        let bearing = bearing_deg.to_radians();
        Self::new(
            time_millis,
            latitude,
            longitude,
            altitude_msl,
            ground_speed * bearing.cos(),
            ground_speed * bearing.sin(),
        )
    }
}

/// A raw barometric sensor reading.
///
/// Barometric samples arrive on a nanosecond sensor clock that is distinct
/// from (and not synchronized with) the GPS millisecond clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaroSample {
    /// Sensor timestamp in nanoseconds (monotonic sensor clock).
    pub nano: u64,
    /// Static pressure in pascals.
    pub pressure_pa: f64,
}
