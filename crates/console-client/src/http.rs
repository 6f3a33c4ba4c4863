use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use console_core::ports::{ControlPort, ControlResponse};

/// Wire shape of the free-text command operation: a JSON object with the
/// single `command` key.
#[derive(Debug, Serialize)]
struct CommandPayload {
    command: String,
}

/// HTTP transport for the control endpoint. One shared client with a
/// bounded timeout, so a hung endpoint surfaces as a transport failure
/// instead of blocking the console forever.
pub struct HttpControl {
    client: reqwest::Client,
    api_url: String,
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl HttpControl {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Any response at all, success or not, becomes a `ControlResponse`
    /// with the body read as opaque text. Only a failed round trip is an
    /// `Err`.
    async fn post(&self, path: &str, payload: Option<&CommandPayload>) -> Result<ControlResponse> {
        let url = format!("{}{}", self.api_url, path);
        debug!("POST {}", url);

        let mut request = self.client.post(&url);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let ok = response.status().is_success();
        let body = response.text().await?;
        Ok(ControlResponse { ok, body })
    }
}

#[async_trait]
impl ControlPort for HttpControl {
    async fn start(&self) -> Result<ControlResponse> {
        self.post("/start", None).await
    }

    async fn stop(&self) -> Result<ControlResponse> {
        self.post("/stop", None).await
    }

    async fn send_command(&self, command: &str) -> Result<ControlResponse> {
        let payload = CommandPayload {
            command: command.to_string(),
        };
        self.post("/command", Some(&payload)).await
    }
}
