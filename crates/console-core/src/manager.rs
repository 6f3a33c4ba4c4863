use tokio::sync::mpsc;
use tracing::debug;

use crate::log::{SharedLogBuffer, ERR_MARKER, INFO_MARKER};
use crate::ports::{StreamEvent, StreamHandle, StreamPort};
use crate::state::ConnectionState;

/// Owns the one live stream and drives the four-state lifecycle. Every
/// stream event becomes a log entry; stream failures are absorbed into
/// the buffer and the close path, never raised to the caller. There is
/// no automatic reconnect; the operator calls `connect` again after the
/// state settles on `Disconnected`.
pub struct ConnectionManager<S: StreamPort> {
    transport: S,
    url: String,
    state: ConnectionState,
    logs: SharedLogBuffer,
    stream: Option<Box<dyn StreamHandle>>,
}

impl<S: StreamPort> ConnectionManager<S> {
    pub fn new(transport: S, url: impl Into<String>, logs: SharedLogBuffer) -> Self {
        Self {
            transport,
            url: url.into(),
            state: ConnectionState::Disconnected,
            logs,
            stream: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn logs(&self) -> SharedLogBuffer {
        self.logs.clone()
    }

    fn append(&self, message: String) {
        self.logs.lock().unwrap().append(message);
    }

    /// Begin a connection attempt. Clears the previous session's log,
    /// opens the stream and returns the event receiver for the caller to
    /// pump into `handle_stream_event`. Only one logical connection
    /// exists at a time: calling from any state other than
    /// `Disconnected` is a no-op apart from an informational entry — it
    /// never opens a second stream and never clears the buffer a second
    /// time, including while a prior attempt or close is still pending.
    pub async fn connect(&mut self) -> Option<mpsc::Receiver<StreamEvent>> {
        if self.state != ConnectionState::Disconnected {
            let note = match self.state {
                ConnectionState::Connected => "WebSocket already connected.",
                ConnectionState::Connecting => "Connection attempt already in progress.",
                ConnectionState::Disconnecting => "Still disconnecting from WebSocket.",
                ConnectionState::Disconnected => unreachable!(),
            };
            self.append(format!("{} {}", INFO_MARKER, note));
            return None;
        }

        self.logs.lock().unwrap().reset();
        self.append(format!("{} Connecting to WebSocket...", INFO_MARKER));
        self.state = ConnectionState::Connecting;

        match self.transport.open(&self.url).await {
            Ok((handle, events)) => {
                self.stream = Some(handle);
                Some(events)
            }
            Err(e) => {
                // The attempt never produced a stream, so no Closed event
                // will arrive; settle the state here.
                self.append(format!("{} WebSocket connection failed: {}", ERR_MARKER, e));
                self.append(format!("{} Connection to WebSocket closed.", INFO_MARKER));
                self.state = ConnectionState::Disconnected;
                None
            }
        }
    }

    /// Request a graceful close. The transition to `Disconnecting` always
    /// happens for display consistency, but the close request is skipped
    /// when no stream handle exists.
    pub async fn disconnect(&mut self) {
        self.state = ConnectionState::Disconnecting;
        self.append(format!("{} Disconnecting from WebSocket...", INFO_MARKER));

        if let Some(stream) = self.stream.as_mut() {
            if let Err(e) = stream.close().await {
                debug!("close request failed: {}", e);
            }
        }
    }

    /// Apply one stream event to the state machine. The caller pumps the
    /// receiver returned by `connect`; events are serialized through this
    /// single entry point, so the state and the buffer never race.
    pub async fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Opened => {
                self.state = ConnectionState::Connected;
                self.append(format!(
                    "{} Connection to WebSocket established.",
                    INFO_MARKER
                ));
            }
            StreamEvent::Frame(payload) => {
                self.append(payload);
            }
            StreamEvent::Error(detail) => {
                // State stays put; the error forces the close path and the
                // Closed event does the actual transition.
                self.append(format!("{} {}", ERR_MARKER, detail));
                if let Some(stream) = self.stream.as_mut() {
                    if let Err(e) = stream.close().await {
                        debug!("close after error failed: {}", e);
                    }
                }
            }
            StreamEvent::Closed => {
                self.append(format!("{} Connection to WebSocket closed.", INFO_MARKER));
                self.state = ConnectionState::Disconnected;
                self.stream = None;
            }
        }
    }
}
