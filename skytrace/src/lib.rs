//! skytrace - altitude fusion, rangefinder telemetry, and track replay.
//!
//! Ingests positional and altitude telemetry from heterogeneous sources -
//! an onboard barometric sensor, the phone's satellite-location API, and
//! an external Bluetooth Low-Energy rangefinder - and produces a single
//! time-ordered stream of fused [`measurements::Measurement`]s, usable for
//! real-time display and for durable flight-log recording.
//!
//! # Architecture
//!
//! - [`fusion`] - streaming Kalman filtering: one `AltitudeFilter` per raw
//!   altitude source, combined by the `FusionEngine` (barometric rate
//!   preferred, satellite fallback)
//! - [`bluetooth`] - BLE central lifecycle: scan → connect → ready →
//!   disconnected, with automatic recovery across failures and adapter
//!   power cycles
//! - [`protocol`] - per-vendor advertisement recognition and notification
//!   stream decoding (ATN, Uineye, SigSauer)
//! - [`location`] - source arbitration between phone and external-device
//!   positioning, one unified measurement stream
//! - [`track`] - offline replay: parse a recorded log, re-run the same
//!   fusion, trim to the flight segment
//! - [`measurements`], [`altimeter`] - shared data model and pressure
//!   conversion
//! - [`config`], [`logging`] - ini settings and tracing setup
//!
//! The satellite-location API and the BLE radio are collaborators behind
//! narrow boundaries: the core consumes fixes and radio events, and never
//! touches rendering, preference UI, or cloud sync.

pub mod altimeter;
pub mod bluetooth;
pub mod config;
pub mod fusion;
pub mod location;
pub mod logging;
pub mod measurements;
pub mod protocol;
pub mod track;

pub use fusion::{AltitudeFilter, FusionEngine};
pub use location::{LocationArbiter, LocationMode};
pub use measurements::{BaroSample, GpsFix, Measurement};
pub use track::{auto_trim, load_track, read_track, TrackPoint};
