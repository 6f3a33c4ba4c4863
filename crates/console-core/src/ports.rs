use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Everything the duplex stream can tell us, as one event enum delivered
/// over a channel instead of four separate callbacks. The stream is
/// receive-only from the operator's perspective; there is no outbound
/// frame variant.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The connection attempt completed and the stream is live.
    Opened,
    /// One inbound frame, one log line, opaque text.
    Frame(String),
    /// The stream reported an error; closure follows.
    Error(String),
    /// The stream is gone, whatever the cause. Emitted exactly once per
    /// open attempt.
    Closed,
}

/// Capability to request a graceful close of a live stream. Must tolerate
/// a connection that already died underneath it.
#[async_trait]
pub trait StreamHandle: Send {
    async fn close(&mut self) -> Result<()>;
}

/// Transport seam for the streaming connection. `open` initiates and
/// returns promptly; the outcome of the attempt arrives as events on the
/// returned receiver (`Opened`, or `Error` followed by `Closed`).
#[async_trait]
pub trait StreamPort: Send + Sync {
    async fn open(
        &self,
        url: &str,
    ) -> Result<(Box<dyn StreamHandle>, mpsc::Receiver<StreamEvent>)>;
}

/// An HTTP round trip that produced a response. `ok` mirrors a 2xx
/// status; the body is opaque human-readable text either way.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlResponse {
    pub ok: bool,
    pub body: String,
}

/// Transport seam for the control endpoint, independent of the stream.
/// `Err` means the endpoint could not be reached at all; an application
/// level rejection comes back as `Ok` with `ok: false`.
#[async_trait]
pub trait ControlPort: Send + Sync {
    async fn start(&self) -> Result<ControlResponse>;
    async fn stop(&self) -> Result<ControlResponse>;
    async fn send_command(&self, command: &str) -> Result<ControlResponse>;
}
