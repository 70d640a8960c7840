//! Connection lifecycle states for one external device role.

/// State of the rangefinder connection lifecycle.
///
/// Transitions are driven only by the owning state machine; exactly one
/// machine is active per logical device role at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not running.
    #[default]
    Stopped,
    /// Scanning for a supported advertisement.
    Scanning,
    /// Connect issued, waiting for the link to come up.
    Connecting,
    /// Link established, decoder bound, notifications flowing.
    Connected,
    /// Explicit stop in progress.
    Stopping,
}

impl ConnectionState {
    /// True while the role is running (scan/connect/connected).
    ///
    /// Reconnection logic checks this before firing, because a disconnect
    /// callback can race with an explicit stop.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Scanning | Self::Connecting | Self::Connected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Scanning => write!(f, "Scanning"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Stopping => write!(f, "Stopping"),
        }
    }
}
