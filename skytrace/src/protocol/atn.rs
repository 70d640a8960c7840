//! ATN rangefinder protocol.
//!
//! ATN devices advertise a name starting with "ATN" and stream ASCII
//! readings, one per line: `ATN,<meters>\r\n`. A reading can be split
//! across notifications, so the decoder buffers bytes until a newline.

use tracing::trace;

use super::RangingEvent;

/// Line buffer cap; anything longer is junk and gets discarded.
const MAX_LINE_LEN: usize = 64;

/// Recognize an ATN rangefinder from its advertisement.
pub fn matches(device_name: &str, _advertisement: &[u8]) -> bool {
    device_name.starts_with("ATN")
}

/// Decoder for the ATN ASCII line protocol.
#[derive(Debug, Default)]
pub struct AtnDecoder {
    /// Bytes of the current, not-yet-terminated line.
    buffer: Vec<u8>,
}

impl AtnDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed notification bytes; returns a ranging event when a complete
    /// line parses.
    pub fn decode(&mut self, frame: &[u8]) -> Option<RangingEvent> {
        let mut event = None;
        for &byte in frame {
            if byte == b'\n' {
                if let Some(parsed) = parse_line(&self.buffer) {
                    // Keep the latest reading if one payload carries several lines
                    event = Some(parsed);
                } else if !self.buffer.is_empty() {
                    trace!(len = self.buffer.len(), "Dropping malformed ATN line");
                }
                self.buffer.clear();
            } else if self.buffer.len() < MAX_LINE_LEN {
                self.buffer.push(byte);
            } else {
                // Runaway line with no terminator: discard and resync
                self.buffer.clear();
            }
        }
        event
    }
}

/// Parse one complete `ATN,<meters>` line (trailing `\r` tolerated).
fn parse_line(line: &[u8]) -> Option<RangingEvent> {
    let text = std::str::from_utf8(line).ok()?.trim_end_matches('\r');
    let value = text.strip_prefix("ATN,")?;
    let distance_m: f64 = value.trim().parse().ok()?;
    if !distance_m.is_finite() || distance_m < 0.0 {
        return None;
    }
    Some(RangingEvent {
        distance_m,
        device_time_ms: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame() {
        let mut decoder = AtnDecoder::new();
        let ev = decoder.decode(b"ATN,123.5\r\n").unwrap();
        assert_eq!(ev.distance_m, 123.5);
        assert_eq!(ev.device_time_ms, None);
    }

    #[test]
    fn test_split_across_notifications() {
        let mut decoder = AtnDecoder::new();
        assert!(decoder.decode(b"ATN,9").is_none());
        assert!(decoder.decode(b"87.2").is_none());
        let ev = decoder.decode(b"5\r\n").unwrap();
        assert_eq!(ev.distance_m, 987.25);
    }

    #[test]
    fn test_malformed_line_dropped() {
        let mut decoder = AtnDecoder::new();
        assert!(decoder.decode(b"ATN,notanumber\r\n").is_none());
        assert!(decoder.decode(b"BAT,99\r\n").is_none());
        // Decoder resyncs and keeps working
        assert!(decoder.decode(b"ATN,10.0\r\n").is_some());
    }

    #[test]
    fn test_negative_distance_rejected() {
        let mut decoder = AtnDecoder::new();
        assert!(decoder.decode(b"ATN,-4.2\r\n").is_none());
    }

    #[test]
    fn test_runaway_line_resyncs() {
        let mut decoder = AtnDecoder::new();
        assert!(decoder.decode(&[b'x'; 200]).is_none());
        assert!(decoder.decode(b"\nATN,55.0\r\n").is_some());
    }
}
