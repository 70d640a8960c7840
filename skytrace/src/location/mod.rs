//! Location arbiter - one unified measurement stream over two sources.
//!
//! The phone's satellite-location API and the external Bluetooth device
//! are alternatives, never merged: configuration selects exactly one
//! position path. Whichever source is selected, barometric samples always
//! feed the fusion engine's altitude-rate refinement.
//!
//! Emitted [`Measurement`]s fan out on a broadcast channel; a slow or
//! dropped subscriber can never block or corrupt the producer.

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::Settings;
use crate::fusion::FusionEngine;
use crate::measurements::{BaroSample, GpsFix, Measurement};

/// Which positioning path supplies ground-truth position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationMode {
    /// Phone-native satellite positioning.
    #[default]
    Phone,
    /// External Bluetooth device positioning.
    Bluetooth,
}

impl std::fmt::Display for LocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phone => write!(f, "phone"),
            Self::Bluetooth => write!(f, "bluetooth"),
        }
    }
}

/// Chooses between phone and external-device positioning and exposes one
/// measurement stream regardless of source.
pub struct LocationArbiter {
    mode: LocationMode,
    altimeter_enabled: bool,
    engine: FusionEngine,
    measurement_tx: broadcast::Sender<Measurement>,
}

impl LocationArbiter {
    /// Create an arbiter for the configured mode.
    pub fn new(mode: LocationMode, measurement_tx: broadcast::Sender<Measurement>) -> Self {
        info!(%mode, "Starting location arbiter");
        Self {
            mode,
            altimeter_enabled: true,
            engine: FusionEngine::new(),
            measurement_tx,
        }
    }

    /// Create an arbiter from user settings.
    pub fn from_settings(settings: &Settings, measurement_tx: broadcast::Sender<Measurement>) -> Self {
        let mut arbiter = Self::new(settings.location_mode, measurement_tx);
        arbiter.altimeter_enabled = settings.altimeter_enabled;
        arbiter
    }

    /// The currently selected position source.
    pub fn mode(&self) -> LocationMode {
        self.mode
    }

    /// Human-readable name of the active data source.
    pub fn data_source(&self) -> &'static str {
        match self.mode {
            LocationMode::Phone => "Phone GPS",
            LocationMode::Bluetooth => "Bluetooth device",
        }
    }

    /// Switch position source, e.g. when the bluetooth preference toggles.
    pub fn set_mode(&mut self, mode: LocationMode) {
        if mode != self.mode {
            info!(from = %self.mode, to = %mode, "Switching location source");
            self.mode = mode;
        }
    }

    /// Subscribe to the fused measurement stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Measurement> {
        self.measurement_tx.subscribe()
    }

    /// A fix from the phone's satellite-location API.
    ///
    /// Ignored unless the phone path is selected.
    pub fn receive_phone_fix(&mut self, fix: &GpsFix) {
        if self.mode == LocationMode::Phone {
            self.emit(fix);
        } else {
            debug!("Ignoring phone fix while bluetooth source is selected");
        }
    }

    /// A positioning fix decoded from the external device.
    ///
    /// Ignored unless the bluetooth path is selected.
    pub fn receive_device_fix(&mut self, fix: &GpsFix) {
        if self.mode == LocationMode::Bluetooth {
            self.emit(fix);
        } else {
            debug!("Ignoring device fix while phone source is selected");
        }
    }

    /// A barometric sample. Refines climb rate for either source; never
    /// emits a measurement on its own.
    pub fn receive_pressure(&mut self, sample: &BaroSample) {
        if self.altimeter_enabled {
            self.engine.update_baro(sample);
        }
    }

    fn emit(&mut self, fix: &GpsFix) {
        let measurement = self.engine.update_fix(fix);
        let _ = self.measurement_tx.send(measurement);
    }
}
