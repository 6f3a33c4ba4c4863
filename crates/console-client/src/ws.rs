use anyhow::Result;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

use console_core::ports::{StreamEvent, StreamHandle, StreamPort};

/// WebSocket transport for the log stream. `open` spawns the connection
/// task and returns right away; the attempt's outcome arrives as events.
pub struct WsStream;

struct WsHandle {
    close_tx: mpsc::Sender<()>,
}

#[async_trait]
impl StreamHandle for WsHandle {
    async fn close(&mut self) -> Result<()> {
        // The connection task may already be gone; a dead channel is not
        // an error for the caller.
        let _ = self.close_tx.send(()).await;
        Ok(())
    }
}

#[async_trait]
impl StreamPort for WsStream {
    async fn open(
        &self,
        url: &str,
    ) -> Result<(Box<dyn StreamHandle>, mpsc::Receiver<StreamEvent>)> {
        let (event_tx, event_rx) = mpsc::channel(200);
        let (close_tx, close_rx) = mpsc::channel(1);
        tokio::spawn(run(url.to_string(), event_tx, close_rx));
        Ok((Box::new(WsHandle { close_tx }), event_rx))
    }
}

/// One connection attempt, start to finish. Whatever happens, exactly one
/// `Closed` event ends the stream.
async fn run(url: String, events: mpsc::Sender<StreamEvent>, mut close_rx: mpsc::Receiver<()>) {
    info!("connecting to {}", url);
    match connect_async(&url).await {
        Ok((ws_stream, _)) => {
            let _ = events.send(StreamEvent::Opened).await;
            let (mut write, mut read) = ws_stream.split();
            let mut close_requested = false;

            loop {
                tokio::select! {
                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            let _ = events.send(StreamEvent::Frame(text)).await;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            debug!("close frame received: {:?}", frame);
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            let _ = events
                                .send(StreamEvent::Error(format!(
                                    "WebSocket connection failed: {}",
                                    e
                                )))
                                .await;
                            break;
                        }
                        None => break,
                    },
                    req = close_rx.recv(), if !close_requested => {
                        // Stop polling after the first request; a dropped
                        // handle also lands here once.
                        close_requested = true;
                        if req.is_some() {
                            let frame = CloseFrame {
                                code: CloseCode::Normal,
                                reason: "manual disconnection".into(),
                            };
                            if write.send(Message::Close(Some(frame))).await.is_err() {
                                break;
                            }
                            // Keep reading until the remote acknowledges.
                        }
                    }
                }
            }
        }
        Err(e) => {
            let _ = events
                .send(StreamEvent::Error(format!(
                    "WebSocket connection failed: {}",
                    e
                )))
                .await;
        }
    }
    let _ = events.send(StreamEvent::Closed).await;
    info!("stream finished: {}", url);
}
