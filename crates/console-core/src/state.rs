use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the single streaming connection. Exactly one state is
/// active at any instant; this is the source of truth gating whether
/// control commands are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// How a status indicator should read the current state. The three
/// non-connected states map explicitly; the transitional pair is never
/// folded into `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Healthy,
    Transitional,
    Down,
}

impl ConnectionState {
    pub fn tone(self) -> StatusTone {
        match self {
            ConnectionState::Connected => StatusTone::Healthy,
            ConnectionState::Connecting | ConnectionState::Disconnecting => {
                StatusTone::Transitional
            }
            ConnectionState::Disconnected => StatusTone::Down,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnecting => "Disconnecting",
        };
        write!(f, "{}", label)
    }
}
