//! Radio stack boundary - the thin event/command interface to BLE.
//!
//! The core never talks to a BLE stack directly. The host supplies an
//! implementation of [`BleRadio`] for outgoing commands and feeds
//! [`RadioEvent`]s into the state machine's serialized queue. This keeps
//! the radio an injected collaborator rather than an ambient global, and
//! makes the whole connection lifecycle testable with a mock.

/// Adapter power state, as surfaced by the host radio stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Radio is powered and usable.
    On,
    /// Radio is powered off or unavailable.
    Off,
}

/// A peripheral discovered during a scan pass.
///
/// Ephemeral: rebuilt on every scan cycle, discarded on connect. Never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Peripheral address (whatever identity string the stack provides).
    pub address: String,
    /// Advertised device name, if broadcast.
    pub name: Option<String>,
    /// Raw advertisement payload (manufacturer data).
    pub advertisement: Vec<u8>,
}

impl DeviceRecord {
    /// Advertised name or empty string.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Events delivered by the host radio stack.
///
/// These arrive asynchronously from the radio but must be serialized onto
/// the state machine's single processing queue before touching any state.
#[derive(Debug, Clone)]
pub enum RadioEvent {
    /// A peripheral was discovered during scanning.
    Discovered(DeviceRecord),
    /// A connection attempt succeeded.
    Connected { address: String },
    /// A connection attempt failed.
    ConnectionFailed { address: String },
    /// An established connection dropped.
    Disconnected { address: String },
    /// Bytes arrived on the subscribed characteristic.
    CharacteristicUpdate(Vec<u8>),
    /// The adapter was powered on or off.
    AdapterStateChanged(AdapterState),
}

/// Outgoing commands to the host radio stack.
///
/// Implementations must not block; command completion is reported back
/// through [`RadioEvent`]s.
pub trait BleRadio: Send {
    /// Begin scanning for peripherals.
    fn start_scan(&mut self);

    /// Halt an in-progress scan.
    fn stop_scan(&mut self);

    /// Connect to the peripheral at `address`.
    fn connect(&mut self, address: &str);

    /// Cancel any in-flight or established connection.
    fn cancel_connection(&mut self);
}
