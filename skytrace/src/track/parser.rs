//! Track file parsing.
//!
//! Reads a recorded track row by row and re-derives the fused altitude
//! stream with the same [`FusionEngine`] the live path uses. Filters are
//! created fresh for every file.
//!
//! Rows are dispatched by the `sensor` column when present (`gps` or
//! `alt`); files without one are treated as FlySight exports, which carry
//! a ready-made `velD` descent rate and an ISO-8601 `time` column. A row
//! that fails required-field parsing is skipped with a warning, never
//! aborting the file.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use super::columns::TrackColumns;
use super::{RowKind, TrackPoint};
use crate::fusion::FusionEngine;
use crate::measurements::{BaroSample, GpsFix, Measurement};

/// Error type for track file reading.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Track file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to open track file: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a track file into measurements with row provenance.
///
/// Supports both plain CSV and gzip-compressed files, selected by the
/// `.gz` extension. A file that turns out to be truncated or unreadable
/// mid-stream yields an empty result rather than partial garbage.
pub fn read_track(path: &Path) -> Result<Vec<TrackPoint>, TrackError> {
    if !path.exists() {
        return Err(TrackError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let points = if path.extension().is_some_and(|ext| ext == "gz") {
        debug!(path = %path.display(), "Reading gzip compressed track file");
        read_rows(BufReader::new(GzDecoder::new(file)))
    } else {
        read_rows(BufReader::new(file))
    };
    match points {
        Ok(points) => Ok(points),
        Err(e) => {
            // Premature end of gzip stream or mid-file read error
            warn!(path = %path.display(), error = %e, "Error reading track data");
            Ok(Vec::new())
        }
    }
}

/// Parse track rows from a reader.
fn read_rows<R: Read>(reader: BufReader<R>) -> std::io::Result<Vec<TrackPoint>> {
    let mut engine = FusionEngine::new();
    let mut points = Vec::new();

    let mut lines = reader.lines();
    let Some(header) = lines.next().transpose()? else {
        return Ok(points);
    };
    let columns = TrackColumns::from_header(&header);
    let sensor_column = columns.get("sensor");

    for line in lines {
        let line = line?;
        let row: Vec<&str> = line.split(',').collect();
        let kind = match sensor_column {
            None => RowKind::FlySight,
            Some(i) => match row.get(i).copied() {
                Some("gps") => RowKind::Gps,
                Some("alt") => RowKind::Alt,
                other => {
                    debug!(sensor = ?other, "Skipping row with unknown sensor tag");
                    continue;
                }
            },
        };
        match kind {
            RowKind::FlySight => {
                if let Some(point) = parse_flysight_row(&columns, &row) {
                    points.push(point);
                }
            }
            RowKind::Gps => {
                if let Some(point) = parse_gps_row(&columns, &row, &mut engine) {
                    points.push(point);
                }
            }
            RowKind::Alt => {
                // Altimeter rows update the barometric filter, never emit
                if !parse_alt_row(&columns, &row, &mut engine) {
                    warn!("Skipping unparsable altimeter row");
                }
            }
        }
    }

    Ok(points)
}

/// FlySight row: ISO `time`, position, velocities, `velD` descent rate.
fn parse_flysight_row(columns: &TrackColumns, row: &[&str]) -> Option<TrackPoint> {
    let time_millis = columns.get_millis(row, "time")?;
    let latitude = columns.get_f64(row, "lat")?;
    let longitude = columns.get_f64(row, "lon")?;
    let altitude_msl = columns.get_f64(row, "hMSL")?;
    // FlySight reports down-positive velD; climb is its negation
    let climb_rate = -columns.get_f64(row, "velD")?;
    let velocity_north = columns.get_f64(row, "velN").unwrap_or(f64::NAN);
    let velocity_east = columns.get_f64(row, "velE").unwrap_or(f64::NAN);
    if latitude.is_nan() || longitude.is_nan() {
        return None;
    }
    Some(TrackPoint {
        measurement: Measurement {
            time_millis,
            latitude,
            longitude,
            altitude_msl,
            climb_rate,
            velocity_north,
            velocity_east,
            horizontal_accuracy: None,
            vertical_accuracy: None,
            speed_accuracy: None,
        },
        sensor: RowKind::FlySight,
    })
}

/// Internal GPS row: millisecond clock, runs the satellite filter.
fn parse_gps_row(
    columns: &TrackColumns,
    row: &[&str],
    engine: &mut FusionEngine,
) -> Option<TrackPoint> {
    let time_millis = columns.get_u64(row, "millis")?;
    let latitude = columns.get_f64(row, "lat")?;
    let longitude = columns.get_f64(row, "lon")?;
    let altitude_msl = columns.get_f64(row, "hMSL")?;
    if latitude.is_nan() || longitude.is_nan() || altitude_msl.is_nan() {
        return None;
    }
    let velocity_north = columns.get_f64(row, "velN").unwrap_or(f64::NAN);
    let velocity_east = columns.get_f64(row, "velE").unwrap_or(f64::NAN);
    let fix = GpsFix::new(
        time_millis,
        latitude,
        longitude,
        altitude_msl,
        velocity_north,
        velocity_east,
    );
    Some(TrackPoint {
        measurement: engine.update_fix(&fix),
        sensor: RowKind::Gps,
    })
}

/// Internal altimeter row: nanosecond clock, runs the barometric filter.
fn parse_alt_row(columns: &TrackColumns, row: &[&str], engine: &mut FusionEngine) -> bool {
    let Some(nano) = columns.get_u64(row, "nano") else {
        return false;
    };
    let Some(pressure_pa) = columns.get_f64(row, "pressure") else {
        return false;
    };
    if pressure_pa.is_nan() || pressure_pa <= 0.0 {
        return false;
    }
    engine.update_baro(&BaroSample { nano, pressure_pa });
    true
}
