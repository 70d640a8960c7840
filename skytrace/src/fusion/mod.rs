//! Altitude fusion - streaming Kalman filtering over heterogeneous sources.
//!
//! # Components
//!
//! - [`kalman`] - `AltitudeFilter`, the per-source two-state estimator
//! - [`engine`] - `FusionEngine`, dual-clock fusion and measurement emission

pub mod engine;
pub mod kalman;

pub use engine::FusionEngine;
pub use kalman::AltitudeFilter;
