//! Auto-trim: isolate the flight-relevant segment of a recording.
//!
//! A logged track usually includes the aircraft climb-out before exit and
//! ground time after landing. The trim heuristic scans climb rates once:
//! the first strong descent (below -4 m/s) marks the provisional start,
//! and the provisional end keeps moving forward to the last point still
//! descending faster than -2.5 m/s. A fixed margin of samples is kept on
//! both sides.
//!
//! The margin is sample-count-based, not time-based. That is a known
//! limitation of the recording heuristic, kept as-is.

use super::TrackPoint;

/// Samples kept on either side of the detected flight segment.
pub const DEFAULT_TRIM_MARGIN: usize = 50;

/// Climb rate marking the start of strong descent (m/s).
const DESCENT_START_THRESHOLD: f64 = -4.0;

/// Climb rate below which the segment is still considered descending (m/s).
const DESCENT_END_THRESHOLD: f64 = -2.5;

/// Trim climb-out and ground time from track data.
///
/// Returns the flight segment widened by `margin` samples, clamped to the
/// sequence bounds. A track with no strong descent is returned whole.
pub fn auto_trim(points: &[TrackPoint], margin: usize) -> &[TrackPoint] {
    let n = points.len();
    let mut index_start = 0;
    let mut index_end = n;
    for (i, point) in points.iter().enumerate() {
        let climb = point.measurement.climb_rate;
        if index_start == 0 && climb < DESCENT_START_THRESHOLD {
            index_start = i;
        }
        if climb < DESCENT_END_THRESHOLD && index_start < i {
            index_end = i;
        }
    }
    let index_start = index_start.saturating_sub(margin);
    let index_end = (index_end + margin).min(n);
    &points[index_start..index_end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::Measurement;
    use crate::track::RowKind;

    fn points_with_climbs(climbs: &[f64]) -> Vec<TrackPoint> {
        climbs
            .iter()
            .enumerate()
            .map(|(i, &climb_rate)| TrackPoint {
                measurement: Measurement {
                    time_millis: i as u64 * 1000,
                    latitude: 47.0,
                    longitude: 8.0,
                    altitude_msl: 3000.0 - i as f64,
                    climb_rate,
                    velocity_north: 0.0,
                    velocity_east: 0.0,
                    horizontal_accuracy: None,
                    vertical_accuracy: None,
                    speed_accuracy: None,
                },
                sensor: RowKind::Gps,
            })
            .collect()
    }

    #[test]
    fn test_interior_segment_with_margin() {
        let points = points_with_climbs(&[0.0, 0.0, 0.0, -5.0, -5.0, -3.0, -3.0, 0.0, 0.0]);
        let trimmed = auto_trim(&points, 2);
        // Descent runs from index 3 to 6; margin of 2 on each side
        assert_eq!(trimmed.first().unwrap().measurement.time_millis, 1000);
        assert_eq!(trimmed.last().unwrap().measurement.time_millis, 7000);
    }

    #[test]
    fn test_margin_clamps_to_bounds() {
        let points = points_with_climbs(&[0.0, 0.0, 0.0, -5.0, -5.0, -3.0, -3.0, 0.0, 0.0]);
        let trimmed = auto_trim(&points, DEFAULT_TRIM_MARGIN);
        assert_eq!(trimmed.len(), points.len());
    }

    #[test]
    fn test_no_descent_returns_whole_track() {
        let points = points_with_climbs(&[0.0, 1.0, -1.0, 0.5, 0.0]);
        let trimmed = auto_trim(&points, 2);
        assert_eq!(trimmed.len(), points.len());
    }

    #[test]
    fn test_nan_climb_rates_do_not_trigger() {
        let points = points_with_climbs(&[f64::NAN, f64::NAN, f64::NAN]);
        let trimmed = auto_trim(&points, 0);
        assert_eq!(trimmed.len(), points.len());
    }

    #[test]
    fn test_empty_track() {
        let trimmed = auto_trim(&[], DEFAULT_TRIM_MARGIN);
        assert!(trimmed.is_empty());
    }

    #[test]
    fn test_zero_margin_exact_bounds() {
        let points = points_with_climbs(&[0.0, -5.0, -5.0, -3.0, 0.0, 0.0]);
        let trimmed = auto_trim(&points, 0);
        // Start at first strong descent, end at the last sub-threshold index
        assert_eq!(trimmed.first().unwrap().measurement.time_millis, 1000);
        assert_eq!(trimmed.last().unwrap().measurement.time_millis, 2000);
    }
}
