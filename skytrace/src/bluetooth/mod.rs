//! Bluetooth central lifecycle for external rangefinder devices.
//!
//! # Components
//!
//! - [`radio`] - the injected radio stack boundary (`BleRadio`, `RadioEvent`)
//! - [`state`] - `ConnectionState` lifecycle enum
//! - [`service`] - `RangefinderService` state machine + task wrapper

pub mod radio;
pub mod service;
pub mod state;

pub use radio::{AdapterState, BleRadio, DeviceRecord, RadioEvent};
pub use service::{spawn_rangefinder, RangefinderService, ServiceCommand};
pub use state::ConnectionState;
