//! Fusion engine - combines barometric and satellite altitude streams.
//!
//! Two independent [`AltitudeFilter`] instances run side by side, each on
//! its own clock: the satellite filter steps on the GPS millisecond clock,
//! the barometric filter on the sensor's nanosecond clock. The two clocks
//! are a domain quirk, not an artifact - they are never unified.
//!
//! Climb rate on an emitted [`Measurement`] comes from the barometric
//! filter once it has produced a defined rate, because barometric sensors
//! sample far faster than the GPS fix cadence. When no barometric data is
//! present (external devices may supply position without pressure) the
//! satellite filter's rate is used instead.
//!
//! Only position-bearing samples emit a measurement; barometric samples
//! update filter state silently.

use tracing::trace;

use super::kalman::AltitudeFilter;
use crate::altimeter::pressure_to_altitude;
use crate::measurements::{BaroSample, GpsFix, Measurement};

/// Streaming altitude fusion over one barometric and one satellite source.
#[derive(Debug, Default)]
pub struct FusionEngine {
    baro_filter: AltitudeFilter,
    gps_filter: AltitudeFilter,
    /// Last barometric sensor timestamp (nanosecond clock).
    baro_last_nano: Option<u64>,
    /// Last accepted fix timestamp (millisecond clock).
    gps_last_millis: Option<u64>,
}

impl FusionEngine {
    /// Create a fusion engine with fresh filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a barometric sample. Updates filter state, never emits.
    pub fn update_baro(&mut self, sample: &BaroSample) {
        let altitude = pressure_to_altitude(sample.pressure_pa);
        let dt = match self.baro_last_nano {
            Some(last) => (sample.nano.saturating_sub(last)) as f64 * 1e-9,
            None => 0.0,
        };
        self.baro_filter.update(altitude, dt);
        self.baro_last_nano = Some(sample.nano);
        trace!(
            altitude,
            rate = self.baro_filter.rate(),
            "Barometric filter updated"
        );
    }

    /// Process a satellite fix and emit the fused measurement.
    pub fn update_fix(&mut self, fix: &GpsFix) -> Measurement {
        let dt = match self.gps_last_millis {
            Some(last) => (fix.time_millis.saturating_sub(last)) as f64 * 1e-3,
            None => 0.0,
        };
        self.gps_filter.update(fix.altitude_msl, dt);
        self.gps_last_millis = Some(fix.time_millis);

        Measurement {
            time_millis: fix.time_millis,
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude_msl: fix.altitude_msl,
            climb_rate: self.climb_rate(),
            velocity_north: fix.velocity_north,
            velocity_east: fix.velocity_east,
            horizontal_accuracy: fix.horizontal_accuracy,
            vertical_accuracy: fix.vertical_accuracy,
            speed_accuracy: fix.speed_accuracy,
        }
    }

    /// Current climb rate estimate: barometric when defined, else satellite.
    pub fn climb_rate(&self) -> f64 {
        let baro = self.baro_filter.rate();
        if self.baro_last_nano.is_none() || baro.is_nan() {
            self.gps_filter.rate()
        } else {
            baro
        }
    }

    /// Current smoothed satellite altitude, NaN before the first fix.
    pub fn gps_altitude(&self) -> f64 {
        self.gps_filter.value()
    }

    /// Current smoothed barometric (pressure) altitude, NaN before the first sample.
    pub fn baro_altitude(&self) -> f64 {
        self.baro_filter.value()
    }
}
