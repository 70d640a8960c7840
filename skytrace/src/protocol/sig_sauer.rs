//! SigSauer KILO rangefinder protocol.
//!
//! KILO devices advertise a name starting with "SIG" (or a manufacturer
//! payload that begins with the ASCII bytes `SIG`). Readings arrive as
//! fixed 10-byte notifications:
//!
//! ```text
//! 'S' 'K' <f32 LE distance, meters> <u32 LE device time, ms>
//! ```
//!
//! The device clock can jump backwards briefly after a re-range; reported
//! timestamps are clamped monotonically non-decreasing within a
//! connection.

use tracing::trace;

use super::RangingEvent;

const MAGIC: [u8; 2] = [b'S', b'K'];
const FRAME_LEN: usize = 10;

/// Recognize a SigSauer KILO rangefinder from its advertisement.
pub fn matches(device_name: &str, advertisement: &[u8]) -> bool {
    device_name.starts_with("SIG") || advertisement.starts_with(b"SIG")
}

/// Decoder for the SigSauer fixed-frame protocol.
#[derive(Debug, Default)]
pub struct SigSauerDecoder {
    /// Highest device timestamp seen this connection.
    last_device_time_ms: Option<u64>,
}

impl SigSauerDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one notification. Frames are never split by this vendor;
    /// anything that is not a complete valid frame is dropped.
    pub fn decode(&mut self, frame: &[u8]) -> Option<RangingEvent> {
        if frame.len() != FRAME_LEN || frame[..2] != MAGIC {
            trace!(len = frame.len(), "Dropping malformed SigSauer frame");
            return None;
        }
        let distance_m = f32::from_le_bytes([frame[2], frame[3], frame[4], frame[5]]) as f64;
        if !distance_m.is_finite() || distance_m < 0.0 {
            return None;
        }
        let raw_time = u32::from_le_bytes([frame[6], frame[7], frame[8], frame[9]]) as u64;
        // Clamp the device clock monotonically non-decreasing
        let device_time = match self.last_device_time_ms {
            Some(last) if raw_time < last => last,
            _ => raw_time,
        };
        self.last_device_time_ms = Some(device_time);
        Some(RangingEvent {
            distance_m,
            device_time_ms: Some(device_time),
        })
    }
}
