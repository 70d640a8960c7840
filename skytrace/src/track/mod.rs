//! Offline track replay.
//!
//! The offline counterpart to the live fusion path: parses a previously
//! recorded flight log, re-runs the same altitude fusion, and trims the
//! result to the meaningful flight segment.
//!
//! # Components
//!
//! - [`columns`] - header parsing with legacy column aliases
//! - [`parser`] - row-by-row parsing (plain or gzip) through a fresh `FusionEngine`
//! - [`trim`] - climb-rate based flight segment extraction

pub mod columns;
pub mod parser;
pub mod trim;

pub use columns::TrackColumns;
pub use parser::{read_track, TrackError};
pub use trim::{auto_trim, DEFAULT_TRIM_MARGIN};

use std::path::Path;

use crate::measurements::Measurement;

/// Which row schema produced a parsed measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A foreign single-format row (FlySight export, no `sensor` column).
    FlySight,
    /// An internal GPS row (`sensor` = `gps`, millisecond clock).
    Gps,
    /// An internal altimeter row (`sensor` = `alt`, nanosecond clock).
    /// Altimeter rows feed the barometric filter and never produce a
    /// point themselves.
    Alt,
}

/// A parsed measurement plus its row provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub measurement: Measurement,
    pub sensor: RowKind,
}

/// Parse a track file and trim it to the flight segment.
///
/// Convenience wrapper over [`read_track`] and [`auto_trim`] with the
/// default margin.
pub fn load_track(path: &Path) -> Result<Vec<TrackPoint>, TrackError> {
    let points = read_track(path)?;
    let trimmed = auto_trim(&points, DEFAULT_TRIM_MARGIN);
    Ok(trimmed.to_vec())
}
