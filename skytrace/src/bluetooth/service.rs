//! Rangefinder connection state machine.
//!
//! Owns the scan → connect → ready → disconnected lifecycle for a single
//! external BLE device, drives protocol detection, and supervises
//! reconnection. All transitions happen on one serialized queue: radio
//! callbacks and start/stop commands are funneled through
//! [`spawn_rangefinder`], so no two events for the same role ever execute
//! concurrently.
//!
//! Reconnection is unbounded with no backoff: the peripheral's own
//! advertising cadence paces retry. An adapter power cycle restarts
//! scanning automatically whenever the role was active, making the device
//! path self-healing across radio toggles.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use super::radio::{AdapterState, BleRadio, DeviceRecord, RadioEvent};
use super::state::ConnectionState;
use crate::protocol::{ProtocolDecoder, ProtocolVariant, RangingEvent};

/// Commands accepted by a running rangefinder service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCommand {
    /// Begin scanning.
    Start,
    /// Halt scanning and tear down any connection.
    Stop,
}

/// State machine for one external rangefinder role.
///
/// The synchronous core: every method must be called from a single
/// processing context. [`spawn_rangefinder`] provides that context.
pub struct RangefinderService {
    radio: Box<dyn BleRadio>,
    state: ConnectionState,
    /// Decoder for the current connection. Created at recognition time,
    /// destroyed on disconnect, never reused across connections.
    decoder: Option<ProtocolDecoder>,
    current_address: Option<String>,
    ranging_tx: broadcast::Sender<RangingEvent>,
}

impl RangefinderService {
    /// Create a service over an injected radio stack.
    ///
    /// Decoded ranging events go out on `ranging_tx`.
    pub fn new(radio: Box<dyn BleRadio>, ranging_tx: broadcast::Sender<RangingEvent>) -> Self {
        Self {
            radio,
            state: ConnectionState::Stopped,
            decoder: None,
            current_address: None,
            ranging_tx,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Protocol variant of the currently bound decoder, if any.
    pub fn protocol(&self) -> Option<ProtocolVariant> {
        self.decoder.as_ref().map(|d| d.variant())
    }

    /// Subscribe to decoded ranging events.
    pub fn subscribe(&self) -> broadcast::Receiver<RangingEvent> {
        self.ranging_tx.subscribe()
    }

    /// Start scanning for rangefinders.
    pub fn start(&mut self) {
        match self.state {
            ConnectionState::Stopped => self.scan(),
            ConnectionState::Scanning => warn!("Already scanning"),
            ConnectionState::Stopping => warn!("Already stopping"),
            ConnectionState::Connecting | ConnectionState::Connected => {
                warn!(state = %self.state, "Already started")
            }
        }
    }

    /// Stop the role. Idempotent; always ends in `Stopped`.
    pub fn stop(&mut self) {
        if self.state == ConnectionState::Stopped {
            return;
        }
        self.state = ConnectionState::Stopping;
        self.radio.stop_scan();
        if self.current_address.is_some() {
            self.radio.cancel_connection();
        }
        self.decoder = None;
        self.current_address = None;
        self.state = ConnectionState::Stopped;
        info!("Rangefinder service stopped");
    }

    /// Process one radio event.
    pub fn on_event(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::Discovered(record) => self.on_discovered(record),
            RadioEvent::Connected { address } => {
                info!(address, "Rangefinder connected");
                self.state = ConnectionState::Connected;
            }
            RadioEvent::ConnectionFailed { address } => {
                warn!(address, "Rangefinder connection failed");
                self.decoder = None;
                self.current_address = None;
                // Start over, unless a stop raced in
                if self.state.is_active() {
                    self.scan();
                }
            }
            RadioEvent::Disconnected { address } => {
                info!(address, "Rangefinder disconnected");
                self.decoder = None;
                self.current_address = None;
                // Go back to searching, unless a stop raced in
                if self.state.is_active() {
                    self.scan();
                }
            }
            RadioEvent::CharacteristicUpdate(bytes) => self.on_bytes(&bytes),
            RadioEvent::AdapterStateChanged(adapter) => self.on_adapter_changed(adapter),
        }
    }

    fn scan(&mut self) {
        self.state = ConnectionState::Scanning;
        info!("Scanning for laser rangefinders");
        self.radio.start_scan();
    }

    fn on_discovered(&mut self, record: DeviceRecord) {
        if self.state != ConnectionState::Scanning {
            debug!(state = %self.state, "Ignoring discovery outside of scanning");
            return;
        }
        let Some(variant) = ProtocolVariant::detect(&record) else {
            // Unsupported advertisement: leave the device alone
            return;
        };
        info!(
            protocol = %variant,
            name = record.name(),
            address = record.address,
            "Rangefinder found, connecting"
        );
        // Scanning is paused before the connect is issued
        self.radio.stop_scan();
        self.state = ConnectionState::Connecting;
        self.decoder = Some(variant.decoder());
        self.current_address = Some(record.address.clone());
        self.radio.connect(&record.address);
    }

    fn on_bytes(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if let Some(decoder) = self.decoder.as_mut() {
            if let Some(event) = decoder.decode(bytes) {
                // A dropped or lagging subscriber never blocks decoding
                let _ = self.ranging_tx.send(event);
            }
        }
    }

    fn on_adapter_changed(&mut self, adapter: AdapterState) {
        info!(?adapter, "Bluetooth adapter changed state");
        match adapter {
            AdapterState::Off => {
                if self.state.is_active() {
                    // Await power-on in Scanning rather than failing
                    self.decoder = None;
                    self.current_address = None;
                    self.state = ConnectionState::Scanning;
                }
            }
            AdapterState::On => {
                if self.state.is_active() {
                    self.scan();
                }
            }
        }
    }
}

/// Run a rangefinder service on its own serialized event queue.
///
/// Commands and radio events are interleaved onto one task, so no two
/// callbacks for the same role ever run concurrently. The task exits when
/// the command channel closes; the service is stopped on the way out.
pub fn spawn_rangefinder(
    mut service: RangefinderService,
    mut commands: mpsc::Receiver<ServiceCommand>,
    mut events: mpsc::Receiver<RadioEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ServiceCommand::Start) => service.start(),
                    Some(ServiceCommand::Stop) => service.stop(),
                    None => break,
                },
                event = events.recv() => match event {
                    Some(event) => service.on_event(event),
                    None => break,
                },
            }
        }
        service.stop();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records radio commands for assertion.
    #[derive(Debug, Default, Clone)]
    struct MockRadio {
        commands: Arc<Mutex<Vec<String>>>,
    }

    impl BleRadio for MockRadio {
        fn start_scan(&mut self) {
            self.commands.lock().unwrap().push("start_scan".into());
        }
        fn stop_scan(&mut self) {
            self.commands.lock().unwrap().push("stop_scan".into());
        }
        fn connect(&mut self, address: &str) {
            self.commands.lock().unwrap().push(format!("connect {address}"));
        }
        fn cancel_connection(&mut self) {
            self.commands.lock().unwrap().push("cancel_connection".into());
        }
    }

    fn make_service() -> (RangefinderService, MockRadio, broadcast::Receiver<RangingEvent>) {
        let radio = MockRadio::default();
        let (tx, rx) = broadcast::channel(16);
        let service = RangefinderService::new(Box::new(radio.clone()), tx);
        (service, radio, rx)
    }

    fn atn_record() -> DeviceRecord {
        DeviceRecord {
            address: "AA:BB:CC:DD:EE:FF".into(),
            name: Some("ATN-LD99".into()),
            advertisement: vec![],
        }
    }

    #[test]
    fn test_start_then_stop_ends_stopped() {
        let (mut service, _radio, _rx) = make_service();
        service.start();
        assert_eq!(service.state(), ConnectionState::Scanning);
        service.stop();
        assert_eq!(service.state(), ConnectionState::Stopped);
        // Idempotent
        service.stop();
        assert_eq!(service.state(), ConnectionState::Stopped);
    }

    #[test]
    fn test_discovery_binds_decoder_and_connects() {
        let (mut service, radio, _rx) = make_service();
        service.start();
        service.on_event(RadioEvent::Discovered(atn_record()));
        assert_eq!(service.state(), ConnectionState::Connecting);
        assert_eq!(service.protocol(), Some(ProtocolVariant::Atn));
        let commands = radio.commands.lock().unwrap();
        assert!(commands.contains(&"connect AA:BB:CC:DD:EE:FF".to_string()));
    }

    #[test]
    fn test_unsupported_device_left_undiscovered() {
        let (mut service, radio, _rx) = make_service();
        service.start();
        service.on_event(RadioEvent::Discovered(DeviceRecord {
            address: "11:22:33:44:55:66".into(),
            name: Some("HeartRate Pro".into()),
            advertisement: vec![0xde, 0xad],
        }));
        assert_eq!(service.state(), ConnectionState::Scanning);
        assert!(service.protocol().is_none());
        let commands = radio.commands.lock().unwrap();
        assert!(!commands.iter().any(|c| c.starts_with("connect")));
    }

    #[test]
    fn test_connection_failure_rescans() {
        let (mut service, _radio, _rx) = make_service();
        service.start();
        service.on_event(RadioEvent::Discovered(atn_record()));
        service.on_event(RadioEvent::ConnectionFailed {
            address: "AA:BB:CC:DD:EE:FF".into(),
        });
        assert_eq!(service.state(), ConnectionState::Scanning);
        assert!(service.protocol().is_none());
    }

    #[test]
    fn test_disconnect_rescans_and_destroys_decoder() {
        let (mut service, _radio, _rx) = make_service();
        service.start();
        service.on_event(RadioEvent::Discovered(atn_record()));
        service.on_event(RadioEvent::Connected {
            address: "AA:BB:CC:DD:EE:FF".into(),
        });
        assert_eq!(service.state(), ConnectionState::Connected);
        service.on_event(RadioEvent::Disconnected {
            address: "AA:BB:CC:DD:EE:FF".into(),
        });
        assert_eq!(service.state(), ConnectionState::Scanning);
        assert!(service.protocol().is_none());
    }

    #[test]
    fn test_disconnect_after_stop_does_not_rescan() {
        let (mut service, radio, _rx) = make_service();
        service.start();
        service.on_event(RadioEvent::Discovered(atn_record()));
        service.on_event(RadioEvent::Connected {
            address: "AA:BB:CC:DD:EE:FF".into(),
        });
        service.stop();
        radio.commands.lock().unwrap().clear();
        // Disconnect callback racing with the stop
        service.on_event(RadioEvent::Disconnected {
            address: "AA:BB:CC:DD:EE:FF".into(),
        });
        assert_eq!(service.state(), ConnectionState::Stopped);
        assert!(radio.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_adapter_power_cycle_self_heals() {
        let (mut service, radio, _rx) = make_service();
        service.start();
        service.on_event(RadioEvent::Discovered(atn_record()));
        service.on_event(RadioEvent::Connected {
            address: "AA:BB:CC:DD:EE:FF".into(),
        });
        service.on_event(RadioEvent::AdapterStateChanged(AdapterState::Off));
        assert_eq!(service.state(), ConnectionState::Scanning);
        radio.commands.lock().unwrap().clear();
        service.on_event(RadioEvent::AdapterStateChanged(AdapterState::On));
        assert_eq!(service.state(), ConnectionState::Scanning);
        assert!(radio
            .commands
            .lock()
            .unwrap()
            .contains(&"start_scan".to_string()));
    }

    #[test]
    fn test_adapter_power_on_while_stopped_stays_stopped() {
        let (mut service, radio, _rx) = make_service();
        service.on_event(RadioEvent::AdapterStateChanged(AdapterState::On));
        assert_eq!(service.state(), ConnectionState::Stopped);
        assert!(radio.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn test_characteristic_bytes_flow_to_subscribers() {
        let (mut service, _radio, mut rx) = make_service();
        service.start();
        service.on_event(RadioEvent::Discovered(atn_record()));
        service.on_event(RadioEvent::Connected {
            address: "AA:BB:CC:DD:EE:FF".into(),
        });
        service.on_event(RadioEvent::CharacteristicUpdate(b"ATN,42.5\r\n".to_vec()));
        let event = rx.try_recv().unwrap();
        assert_eq!(event.distance_m, 42.5);
    }

    #[test]
    fn test_empty_notification_ignored() {
        let (mut service, _radio, mut rx) = make_service();
        service.start();
        service.on_event(RadioEvent::Discovered(atn_record()));
        service.on_event(RadioEvent::Connected {
            address: "AA:BB:CC:DD:EE:FF".into(),
        });
        service.on_event(RadioEvent::CharacteristicUpdate(vec![]));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_spawned_start_then_stop_ends_stopped() {
        let radio = MockRadio::default();
        let (tx, _rx) = broadcast::channel(16);
        let service = RangefinderService::new(Box::new(radio.clone()), tx);
        let (command_tx, command_rx) = mpsc::channel(8);
        let (_event_tx, event_rx) = mpsc::channel(8);
        let handle = spawn_rangefinder(service, command_rx, event_rx);

        command_tx.send(ServiceCommand::Start).await.unwrap();
        command_tx.send(ServiceCommand::Stop).await.unwrap();
        drop(command_tx);
        handle.await.unwrap();

        let commands = radio.commands.lock().unwrap();
        assert_eq!(commands.first().map(String::as_str), Some("start_scan"));
        assert!(commands.contains(&"stop_scan".to_string()));
    }
}
