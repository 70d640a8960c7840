//! Rangefinder vendor protocols.
//!
//! Each supported vendor gets one [`ProtocolVariant`]: a static recognizer
//! evaluated against every newly discovered peripheral, plus a stateful
//! decoder for its notification byte stream. Recognition runs in a fixed
//! priority order (ATN, then Uineye, then SigSauer); the first match wins.
//!
//! Decoders are created per connection and destroyed on disconnect, so
//! checksum/sequence state never leaks between sessions. A malformed frame
//! is dropped silently - a protocol error must never tear down the
//! connection.

mod atn;
mod sig_sauer;
mod uineye;

pub use atn::AtnDecoder;
pub use sig_sauer::SigSauerDecoder;
pub use uineye::UineyeDecoder;

use crate::bluetooth::radio::DeviceRecord;

/// One decoded laser ranging measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangingEvent {
    /// Measured distance in meters.
    pub distance_m: f64,
    /// Device-reported timestamp in ms, monotonically non-decreasing
    /// within a connection, if the vendor provides one.
    pub device_time_ms: Option<u64>,
}

/// The closed set of supported rangefinder vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVariant {
    Atn,
    Uineye,
    SigSauer,
}

impl ProtocolVariant {
    /// Recognize a discovered peripheral, in fixed priority order.
    ///
    /// Returns the first matching variant, or `None` for unsupported
    /// devices (which are then left alone - no connect attempt).
    pub fn detect(record: &DeviceRecord) -> Option<Self> {
        if atn::matches(record.name(), &record.advertisement) {
            Some(Self::Atn)
        } else if uineye::matches(record.name(), &record.advertisement) {
            Some(Self::Uineye)
        } else if sig_sauer::matches(record.name(), &record.advertisement) {
            Some(Self::SigSauer)
        } else {
            None
        }
    }

    /// Create a fresh decoder for this variant.
    pub fn decoder(&self) -> ProtocolDecoder {
        match self {
            Self::Atn => ProtocolDecoder::Atn(AtnDecoder::new()),
            Self::Uineye => ProtocolDecoder::Uineye(UineyeDecoder::new()),
            Self::SigSauer => ProtocolDecoder::SigSauer(SigSauerDecoder::new()),
        }
    }
}

impl std::fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atn => write!(f, "ATN"),
            Self::Uineye => write!(f, "Uineye"),
            Self::SigSauer => write!(f, "SigSauer"),
        }
    }
}

/// A per-connection decoder holding vendor-specific parse state.
#[derive(Debug)]
pub enum ProtocolDecoder {
    Atn(AtnDecoder),
    Uineye(UineyeDecoder),
    SigSauer(SigSauerDecoder),
}

impl ProtocolDecoder {
    /// Decode one notification payload.
    ///
    /// Empty payloads are ignored without touching decoder state. Partial
    /// frames are buffered across calls where the vendor splits readings.
    pub fn decode(&mut self, frame: &[u8]) -> Option<RangingEvent> {
        if frame.is_empty() {
            return None;
        }
        match self {
            Self::Atn(d) => d.decode(frame),
            Self::Uineye(d) => d.decode(frame),
            Self::SigSauer(d) => d.decode(frame),
        }
    }

    /// The variant this decoder belongs to.
    pub fn variant(&self) -> ProtocolVariant {
        match self {
            Self::Atn(_) => ProtocolVariant::Atn,
            Self::Uineye(_) => ProtocolVariant::Uineye,
            Self::SigSauer(_) => ProtocolVariant::SigSauer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, advertisement: &[u8]) -> DeviceRecord {
        DeviceRecord {
            address: "00:11:22:33:44:55".into(),
            name: if name.is_empty() {
                None
            } else {
                Some(name.into())
            },
            advertisement: advertisement.to_vec(),
        }
    }

    #[test]
    fn test_detect_priority_order() {
        assert_eq!(
            ProtocolVariant::detect(&record("ATN-LD99", &[])),
            Some(ProtocolVariant::Atn)
        );
        assert_eq!(
            ProtocolVariant::detect(&record("Uineye R1200", &[])),
            Some(ProtocolVariant::Uineye)
        );
        assert_eq!(
            ProtocolVariant::detect(&record("SIG KILO3000", &[])),
            Some(ProtocolVariant::SigSauer)
        );
    }

    #[test]
    fn test_unsupported_device_never_matches() {
        assert_eq!(ProtocolVariant::detect(&record("", &[])), None);
        assert_eq!(ProtocolVariant::detect(&record("FitBand 3", &[1, 2, 3])), None);
        assert_eq!(
            ProtocolVariant::detect(&record("garbled\u{fffd}", &[0xff; 16])),
            None
        );
    }

    #[test]
    fn test_empty_payload_is_a_no_op() {
        for variant in [
            ProtocolVariant::Atn,
            ProtocolVariant::Uineye,
            ProtocolVariant::SigSauer,
        ] {
            let mut decoder = variant.decoder();
            assert!(decoder.decode(&[]).is_none());
        }
    }
}
