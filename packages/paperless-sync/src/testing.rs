//! Testing utilities including a mock transport.
//!
//! Useful for exercising the coordinator without a Paperless server.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use url::Url;

use crate::error::{Result, SyncError};
use crate::transport::Transport;

/// Record of a request made through the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub url: String,
    pub token: String,
}

/// Mock transport with canned responses keyed by full URL.
///
/// Clones share responses and the request log, so a test can keep one
/// handle for assertions after moving another into a coordinator.
///
/// # Example
///
/// ```rust
/// use paperless_sync::testing::MockTransport;
/// use serde_json::json;
///
/// let mock = MockTransport::new()
///     .with_json("https://paperless.local/api/documents/", json!([{"id": 1}]));
/// assert_eq!(mock.request_count(), 0);
/// ```
#[derive(Default, Clone)]
pub struct MockTransport {
    responses: Arc<RwLock<HashMap<String, Result<Value>>>>,
    calls: Arc<RwLock<Vec<MockRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a JSON body.
    pub fn add_json(&self, url: impl Into<String>, body: Value) {
        self.responses.write().unwrap().insert(url.into(), Ok(body));
    }

    /// Answer `url` with an error.
    pub fn add_error(&self, url: impl Into<String>, error: SyncError) {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), Err(error));
    }

    pub fn with_json(self, url: impl Into<String>, body: Value) -> Self {
        self.add_json(url, body);
        self
    }

    pub fn with_error(self, url: impl Into<String>, error: SyncError) -> Self {
        self.add_error(url, error);
        self
    }

    pub fn request_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// URLs requested, in call order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .map(|c| c.url.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<MockRequest> {
        self.calls.read().unwrap().clone()
    }

    /// Clear recorded requests, keeping the canned responses.
    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, url: &Url, token: &str) -> Result<Value> {
        self.calls.write().unwrap().push(MockRequest {
            url: url.to_string(),
            token: token.to_string(),
        });

        match self.responses.read().unwrap().get(url.as_str()) {
            Some(response) => response.clone(),
            None => Err(SyncError::Api {
                status: 404,
                message: "Not Found".into(),
            }),
        }
    }
}
