use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::Transport;
use crate::models::{NotificationRequest, TransportResponse};

/// Transport that POSTs requests over HTTP
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &NotificationRequest) -> Result<TransportResponse> {
        debug!(url = %request.display_url(), "Sending build request");

        let body = serde_json::to_vec(&request.body).context("Failed to encode request body")?;

        let mut builder = self.client.post(&request.url).body(body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        // The URL can carry a token in its query, so it is kept out of the error chain
        let response = builder
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Failed to send build request to {}", request.display_url()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read build request response")?;

        debug!(status, bytes = body.len(), "Build request answered");

        Ok(TransportResponse { status, body })
    }
}
