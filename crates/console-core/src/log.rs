use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Marker prefixes for locally synthesized entries. Classification keys on
/// these, so they live in one place.
pub const ERR_MARKER: &str = "[ERR]:";
pub const CMD_MARKER: &str = "[CMD]:";
pub const INFO_MARKER: &str = "[INFO]:";
pub const OK_MARKER: &str = "[OK]:";

/// One console line: the raw message plus the wall-clock time it was
/// appended locally. The remote process does not timestamp its frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Severity-style tag derived from message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogCategory {
    Error,
    Command,
    Info,
    /// Unclassified payloads, e.g. raw frames from the remote process.
    Data,
}

/// Classify a message by its markers, checked in fixed precedence so a
/// message matching several markers resolves deterministically. Error and
/// command annotations are synthesized locally and must stay
/// distinguishable even when a remote payload contains a conflicting
/// marker substring. Pure function over the text; stored entries are
/// never mutated.
pub fn classify(message: &str) -> LogCategory {
    if message.contains(ERR_MARKER) {
        LogCategory::Error
    } else if message.contains(CMD_MARKER) {
        LogCategory::Command
    } else if message.contains(INFO_MARKER) {
        LogCategory::Info
    } else {
        LogCategory::Data
    }
}

impl LogEntry {
    pub fn category(&self) -> LogCategory {
        classify(&self.message)
    }
}

/// Append-only, strictly arrival-ordered sequence of console entries.
/// Never reorders, never deduplicates, never evicts; the buffer lives for
/// one operator session.
#[derive(Debug, Default)]
pub struct LogBuffer {
    entries: Vec<LogEntry>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message with the current local time. Never fails.
    pub fn append<S: Into<String>>(&mut self, message: S) {
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            message: message.into(),
        });
    }

    /// Drop everything, for the start of a fresh connection attempt.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The one buffer shared between the lifecycle manager and the command
/// dispatcher. Display layers only read it.
pub type SharedLogBuffer = Arc<Mutex<LogBuffer>>;

pub fn shared_buffer() -> SharedLogBuffer {
    Arc::new(Mutex::new(LogBuffer::new()))
}
