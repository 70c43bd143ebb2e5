//! Shared fixtures for coordinator tests.

#![allow(dead_code)]

use async_trait::async_trait;
use paperless_sync::testing::MockTransport;
use paperless_sync::{ClientConfig, FetchCoordinator, Result, Transport};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

pub const BASE: &str = "https://paperless.local/api";
pub const DOCUMENTS: &str = "https://paperless.local/api/documents/";

pub fn config() -> ClientConfig {
    ClientConfig::new().with_base_url(BASE).with_token("t0k3n")
}

pub fn coordinator(mock: &MockTransport) -> FetchCoordinator<MockTransport> {
    FetchCoordinator::with_transport(config(), mock.clone())
}

/// Envelope page body.
pub fn page(results: Value, next: Option<&str>) -> Value {
    json!({ "count": 0, "next": next, "previous": null, "results": results })
}

pub fn document_type_url(id: impl std::fmt::Display) -> String {
    format!("{BASE}/document_types/?id={id}")
}

pub fn tag_url(id: impl std::fmt::Display) -> String {
    format!("{BASE}/tags/?id={id}")
}

/// Register a single-record lookup answer.
pub fn lookup(mock: &MockTransport, url: String, id: i64, name: &str) {
    mock.add_json(url, page(json!([{ "id": id, "name": name }]), None));
}

/// Transport that holds every request until a permit is released.
#[derive(Clone)]
pub struct GatedTransport {
    inner: MockTransport,
    gate: Arc<Semaphore>,
}

impl GatedTransport {
    pub fn new(inner: MockTransport) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    /// Let `n` pending or future requests through.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn get_json(&self, url: &Url, token: &str) -> Result<Value> {
        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();
        self.inner.get_json(url, token).await
    }
}
