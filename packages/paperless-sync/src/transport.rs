//! HTTP transport seam.
//!
//! The sync components only need "GET this URL, give me JSON". Keeping that
//! behind a trait lets tests swap in [`MockTransport`](crate::testing::MockTransport).

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, SyncError};

/// Issues authenticated GET requests and returns the decoded JSON body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` with the given API token.
    ///
    /// Non-2xx responses must map to [`SyncError::Api`].
    async fn get_json(&self, url: &Url, token: &str) -> Result<Value>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &Url, token: &str) -> Result<Value> {
        debug!(url = %url, "Paperless request starting");

        let response = self
            .client
            .get(url.clone())
            .header(header::AUTHORIZATION, format!("Token {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Paperless request failed");
                SyncError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            } else {
                body
            };
            warn!(url = %url, status = %status, error = %message, "Paperless API error");
            return Err(SyncError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        serde_json::from_str(&body)
            .map_err(|e| SyncError::Parse(format!("invalid JSON from {}: {}", url, e)))
    }
}
