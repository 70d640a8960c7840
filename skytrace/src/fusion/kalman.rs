//! Altitude Kalman filter.
//!
//! A two-state (altitude, climb rate) Kalman filter for a constant-velocity
//! model with irregular sample intervals. Each raw altitude source gets its
//! own independent instance; barometric and satellite filters are never
//! merged.
//!
//! The gain is time-varying: a longer gap since the previous sample grows
//! the predicted covariance, so the new measurement is trusted more.

/// Measurement noise variance (altitude sensor jitter).
const DEFAULT_SENSOR_VARIANCE: f64 = 600.0;

/// Process noise variance (unmodeled vertical acceleration).
const DEFAULT_ACCELERATION_VARIANCE: f64 = 8.0;

/// Streaming altitude estimator over `(value, elapsed_seconds)` pairs.
///
/// The first sample seeds the altitude estimate directly; the climb rate
/// stays undefined (NaN) until at least one update with positive elapsed
/// time has been processed.
#[derive(Debug, Clone)]
pub struct AltitudeFilter {
    /// Smoothed altitude estimate.
    x: f64,
    /// Smoothed climb rate estimate.
    v: f64,
    // Error covariance
    p11: f64,
    p12: f64,
    p21: f64,
    p22: f64,
    sensor_variance: f64,
    acceleration_variance: f64,
    initialized: bool,
    rate_defined: bool,
}

impl AltitudeFilter {
    /// Create a filter with the default noise model.
    pub fn new() -> Self {
        Self::with_variances(DEFAULT_SENSOR_VARIANCE, DEFAULT_ACCELERATION_VARIANCE)
    }

    /// Create a filter with explicit sensor and acceleration variances.
    pub fn with_variances(sensor_variance: f64, acceleration_variance: f64) -> Self {
        Self {
            x: f64::NAN,
            v: 0.0,
            p11: 1.0,
            p12: 0.0,
            p21: 0.0,
            p22: 1.0,
            sensor_variance,
            acceleration_variance,
            initialized: false,
            rate_defined: false,
        }
    }

    /// Current smoothed altitude, NaN before the first sample.
    pub fn value(&self) -> f64 {
        self.x
    }

    /// Current smoothed climb rate, NaN until a positive-elapsed update.
    pub fn rate(&self) -> f64 {
        if self.rate_defined {
            self.v
        } else {
            f64::NAN
        }
    }

    /// Process one altitude sample.
    ///
    /// `elapsed_seconds` is the time since the previous sample for this
    /// filter instance (zero on the first sample). A non-positive elapsed
    /// time on a later sample blends the value only and leaves the rate
    /// untouched.
    pub fn update(&mut self, value: f64, elapsed_seconds: f64) {
        if !self.initialized {
            self.x = value;
            self.initialized = true;
            return;
        }

        if elapsed_seconds <= 0.0 {
            // Zero-duration update: correct altitude, do not touch the rate.
            let s = self.p11 + self.sensor_variance;
            let k1 = self.p11 / s;
            self.x += k1 * (value - self.x);
            self.p11 *= 1.0 - k1;
            self.p12 *= 1.0 - k1;
            return;
        }

        let dt = elapsed_seconds;

        // Predict
        let predicted = self.x + self.v * dt;

        let dt2 = dt * dt;
        let q11 = 0.25 * dt2 * dt2 * self.acceleration_variance;
        let q12 = 0.5 * dt2 * dt * self.acceleration_variance;
        let q22 = dt2 * self.acceleration_variance;

        let p11 = self.p11 + dt * (self.p12 + self.p21) + dt2 * self.p22 + q11;
        let p12 = self.p12 + dt * self.p22 + q12;
        let p21 = self.p21 + dt * self.p22 + q12;
        let p22 = self.p22 + q22;

        // Correct
        let s = p11 + self.sensor_variance;
        let k1 = p11 / s;
        let k2 = p21 / s;

        let residual = value - predicted;
        self.x = predicted + k1 * residual;
        self.v += k2 * residual;
        self.rate_defined = true;

        self.p11 = (1.0 - k1) * p11;
        self.p12 = (1.0 - k1) * p12;
        self.p21 = p21 - k2 * p11;
        self.p22 = p22 - k2 * p12;
    }
}

impl Default for AltitudeFilter {
    fn default() -> Self {
        Self::new()
    }
}
