pub mod dispatcher;
pub mod log;
pub mod manager;
pub mod mocks;
pub mod ports;
pub mod state;

pub use dispatcher::{CommandDispatcher, CommandOutcome};
pub use log::{LogBuffer, LogCategory, LogEntry, SharedLogBuffer};
pub use manager::ConnectionManager;
pub use ports::{ControlPort, ControlResponse, StreamEvent, StreamHandle, StreamPort};
pub use state::{ConnectionState, StatusTone};
