//! In-crate test doubles for the transport seams, so the state machine
//! and the dispatcher can be exercised without a live network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::ports::{ControlPort, ControlResponse, StreamEvent, StreamHandle, StreamPort};

struct MockHandle {
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl StreamHandle for MockHandle {
    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Stream double wired to a channel the test drives directly. A single
/// open is supported; a second open fails, which the manager's
/// already-connected guard must never trigger.
pub struct MockStream {
    slot: Mutex<Option<(Box<dyn StreamHandle>, mpsc::Receiver<StreamEvent>)>>,
}

impl MockStream {
    /// Returns the stream double, the sender the test uses to inject
    /// events, and the flag recording whether a close was requested.
    pub fn new() -> (Self, mpsc::Sender<StreamEvent>, Arc<AtomicBool>) {
        let (tx, rx) = mpsc::channel(64);
        let closed = Arc::new(AtomicBool::new(false));
        let handle = Box::new(MockHandle {
            closed: closed.clone(),
        });
        let stream = Self {
            slot: Mutex::new(Some((handle, rx))),
        };
        (stream, tx, closed)
    }
}

#[async_trait]
impl StreamPort for MockStream {
    async fn open(
        &self,
        _url: &str,
    ) -> Result<(Box<dyn StreamHandle>, mpsc::Receiver<StreamEvent>)> {
        self.slot
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow!("mock stream already opened"))
    }
}

/// What the scripted control endpoint should answer next.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// A response came back: 2xx (`true`) or not, plus the body.
    Respond(bool, String),
    /// No response at all.
    Unreachable,
}

/// Control double answering from a fixed script and recording every call
/// in order.
pub struct MockControl {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<String>>,
}

impl MockControl {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, call: String) -> Result<ControlResponse> {
        self.calls.lock().unwrap().push(call);
        match self.replies.lock().unwrap().pop_front() {
            Some(ScriptedReply::Respond(ok, body)) => Ok(ControlResponse { ok, body }),
            Some(ScriptedReply::Unreachable) | None => Err(anyhow!("connection refused")),
        }
    }
}

#[async_trait]
impl ControlPort for MockControl {
    async fn start(&self) -> Result<ControlResponse> {
        self.next("start".to_string())
    }

    async fn stop(&self) -> Result<ControlResponse> {
        self.next("stop".to_string())
    }

    async fn send_command(&self, command: &str) -> Result<ControlResponse> {
        self.next(format!("command:{}", command))
    }
}
