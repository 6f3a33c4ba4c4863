use tracing::debug;

use crate::log::{SharedLogBuffer, CMD_MARKER, ERR_MARKER, INFO_MARKER, OK_MARKER};
use crate::ports::ControlPort;

/// What a single control round trip came to. Mirrored into the log for
/// the operator; returned so a facade can react without re-reading the
/// buffer. Nothing here is an error to propagate.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// 2xx response; carries the response body.
    Accepted(String),
    /// Non-2xx response; carries the body verbatim as the error detail.
    Rejected(String),
    /// The endpoint could not be reached at all.
    Unreachable,
    /// Empty or whitespace-only command text; nothing was sent and
    /// nothing was logged.
    SkippedEmpty,
}

/// Issues one-shot control requests against the out-of-band endpoint.
/// Stateless per call; each operation is attempted exactly once with no
/// retry, and the operator retries by repeating the action.
///
/// Protocol invariant, not a UI affordance: these operations are only
/// meaningful while the streaming connection is `Connected`. The
/// dispatcher itself does not check the stream state, because the two
/// channels are transport independent; a command issued while
/// disconnected is still sent and succeeds or fails on its own. The
/// facade enforces eligibility.
pub struct CommandDispatcher<C: ControlPort> {
    control: C,
    logs: SharedLogBuffer,
}

impl<C: ControlPort> CommandDispatcher<C> {
    pub fn new(control: C, logs: SharedLogBuffer) -> Self {
        Self { control, logs }
    }

    fn append(&self, message: String) {
        self.logs.lock().unwrap().append(message);
    }

    /// Ask the remote process to start.
    pub async fn start(&self) -> CommandOutcome {
        self.append(format!("{} Sending start command /api/start...", INFO_MARKER));
        let result = self.control.start().await;
        self.settle(result)
    }

    /// Ask the remote process to stop.
    pub async fn stop(&self) -> CommandOutcome {
        self.append(format!("{} Sending stop command /api/stop...", INFO_MARKER));
        let result = self.control.stop().await;
        self.settle(result)
    }

    /// Forward free-text input to the remote process. Empty or
    /// whitespace-only text reflects an incomplete user action, not a
    /// fault: it is rejected locally with no network call and no entry.
    pub async fn send_command(&self, text: &str) -> CommandOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CommandOutcome::SkippedEmpty;
        }

        self.append(format!("{} {}", CMD_MARKER, trimmed));
        let result = self.control.send_command(trimmed).await;
        self.settle(result)
    }

    fn settle(&self, result: anyhow::Result<crate::ports::ControlResponse>) -> CommandOutcome {
        match result {
            Ok(response) if response.ok => {
                self.append(format!("{} {}", OK_MARKER, response.body));
                CommandOutcome::Accepted(response.body)
            }
            Ok(response) => {
                self.append(format!("{} {}", ERR_MARKER, response.body));
                CommandOutcome::Rejected(response.body)
            }
            Err(e) => {
                debug!("control request failed: {}", e);
                self.append(format!("{} Cannot reach control endpoint.", ERR_MARKER));
                CommandOutcome::Unreachable
            }
        }
    }
}
