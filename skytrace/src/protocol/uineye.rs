//! Uineye rangefinder protocol.
//!
//! Uineye devices advertise either a name starting with "Uineye" or a
//! manufacturer payload beginning with the company bytes `55 1E`. Readings
//! arrive as 7-byte binary frames:
//!
//! ```text
//! AA 55 <len> <seq> <dist_lo> <dist_hi> <checksum>
//! ```
//!
//! `len` is the body length (always 3: seq + distance), distance is a
//! little-endian u16 in decimeters, and the checksum is the XOR of the
//! body bytes. The device retransmits the last reading; duplicate sequence
//! numbers are suppressed.

use tracing::trace;

use super::RangingEvent;

const HEADER: [u8; 2] = [0xaa, 0x55];
const BODY_LEN: usize = 3;
const FRAME_LEN: usize = HEADER.len() + 1 + BODY_LEN + 1;

/// Company identifier leading the manufacturer payload.
const COMPANY_BYTES: [u8; 2] = [0x55, 0x1e];

/// Reassembly buffer cap; beyond this we are not mid-frame, just lost.
const MAX_BUFFER: usize = 4 * FRAME_LEN;

/// Recognize a Uineye rangefinder from its advertisement.
pub fn matches(device_name: &str, advertisement: &[u8]) -> bool {
    device_name.starts_with("Uineye") || advertisement.starts_with(&COMPANY_BYTES)
}

/// Decoder for the Uineye binary frame protocol.
#[derive(Debug, Default)]
pub struct UineyeDecoder {
    /// Partial-frame reassembly buffer.
    buffer: Vec<u8>,
    /// Last accepted sequence number, for duplicate suppression.
    last_seq: Option<u8>,
}

impl UineyeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed notification bytes; returns a ranging event when a complete,
    /// checksummed, non-duplicate frame is assembled.
    pub fn decode(&mut self, frame: &[u8]) -> Option<RangingEvent> {
        self.buffer.extend_from_slice(frame);
        if self.buffer.len() > MAX_BUFFER {
            trace!(len = self.buffer.len(), "Uineye buffer overrun, resyncing");
            self.buffer.clear();
            return None;
        }

        let mut event = None;
        loop {
            // Resync to the frame header
            match find_header(&self.buffer) {
                Some(0) => {}
                Some(offset) => {
                    self.buffer.drain(..offset);
                }
                None => {
                    // Keep at most one trailing byte in case it is half a header
                    let keep = usize::from(self.buffer.last() == Some(&HEADER[0]));
                    let len = self.buffer.len();
                    self.buffer.drain(..len - keep);
                    break;
                }
            }
            if self.buffer.len() < FRAME_LEN {
                break;
            }
            if let Some(parsed) = self.parse_frame() {
                event = Some(parsed);
            }
            self.buffer.drain(..FRAME_LEN);
        }
        event
    }

    /// Parse the frame at the front of the buffer. Caller guarantees a
    /// full header-aligned frame is present.
    fn parse_frame(&mut self) -> Option<RangingEvent> {
        let frame = &self.buffer[..FRAME_LEN];
        if frame[2] as usize != BODY_LEN {
            trace!(len = frame[2], "Uineye frame with unexpected body length");
            return None;
        }
        let body = &frame[3..3 + BODY_LEN];
        let checksum = body.iter().fold(0u8, |acc, b| acc ^ b);
        if checksum != frame[FRAME_LEN - 1] {
            trace!("Uineye checksum mismatch, dropping frame");
            return None;
        }
        let seq = body[0];
        if self.last_seq == Some(seq) {
            trace!(seq, "Uineye duplicate frame suppressed");
            return None;
        }
        self.last_seq = Some(seq);
        let decimeters = u16::from_le_bytes([body[1], body[2]]);
        Some(RangingEvent {
            distance_m: decimeters as f64 * 0.1,
            device_time_ms: None,
        })
    }
}

fn find_header(buffer: &[u8]) -> Option<usize> {
    buffer.windows(HEADER.len()).position(|w| w == HEADER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(seq: u8, decimeters: u16) -> Vec<u8> {
        let [lo, hi] = decimeters.to_le_bytes();
        let checksum = seq ^ lo ^ hi;
        vec![0xaa, 0x55, 0x03, seq, lo, hi, checksum]
    }

    #[test]
    fn test_single_frame() {
        let mut decoder = UineyeDecoder::new();
        let ev = decoder.decode(&frame(1, 1234)).unwrap();
        assert!((ev.distance_m - 123.4).abs() < 1e-9);
    }

    #[test]
    fn test_split_frame_reassembly() {
        let mut decoder = UineyeDecoder::new();
        let bytes = frame(7, 500);
        assert!(decoder.decode(&bytes[..3]).is_none());
        let ev = decoder.decode(&bytes[3..]).unwrap();
        assert!((ev.distance_m - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_checksum_mismatch_dropped() {
        let mut decoder = UineyeDecoder::new();
        let mut bytes = frame(2, 800);
        bytes[6] ^= 0xff;
        assert!(decoder.decode(&bytes).is_none());
        // Next good frame still decodes
        assert!(decoder.decode(&frame(3, 800)).is_some());
    }

    #[test]
    fn test_duplicate_sequence_suppressed() {
        let mut decoder = UineyeDecoder::new();
        assert!(decoder.decode(&frame(9, 640)).is_some());
        assert!(decoder.decode(&frame(9, 640)).is_none());
        assert!(decoder.decode(&frame(10, 640)).is_some());
    }

    #[test]
    fn test_leading_garbage_resyncs() {
        let mut decoder = UineyeDecoder::new();
        let mut bytes = vec![0x00, 0x17, 0xfe];
        bytes.extend_from_slice(&frame(4, 321));
        let ev = decoder.decode(&bytes).unwrap();
        assert!((ev.distance_m - 32.1).abs() < 1e-9);
    }

    #[test]
    fn test_matches_by_company_bytes() {
        assert!(matches("", &[0x55, 0x1e, 0x00]));
        assert!(matches("Uineye R1200", &[]));
        assert!(!matches("Other", &[0x1e, 0x55]));
    }
}
