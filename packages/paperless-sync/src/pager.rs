//! Drains a paginated collection endpoint.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::client::ApiClient;
use crate::error::{Result, SyncError};
use crate::transport::Transport;

/// Follows `next` cursors until the server stops producing them.
pub struct PageFetcher<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> PageFetcher<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Fetch every page starting at `start` and concatenate the items.
    ///
    /// Pages are appended in cursor order and items keep the server's order.
    /// Relative cursors are resolved against `start`. Any failed page fails
    /// the whole drain.
    pub async fn fetch_all(&self, start: &Url) -> Result<Vec<Value>> {
        let mut collected = Vec::new();
        let mut visited = HashSet::new();
        let mut next_url = Some(start.clone());
        let mut pages = 0usize;

        while let Some(url) = next_url.take() {
            if !visited.insert(url.as_str().to_string()) {
                return Err(SyncError::CursorLoop(url.to_string()));
            }

            let (items, next) = self.client.get_page(&url).await?.into_items();
            pages += 1;
            debug!(url = %url, page = pages, items = items.len(), "Fetched page");
            collected.extend(items);

            next_url = match next {
                Some(cursor) => Some(self.resolve_cursor(start, &cursor)?),
                None => None,
            };
        }

        debug!(pages, total = collected.len(), "Pagination complete");
        Ok(collected)
    }

    fn resolve_cursor(&self, start: &Url, cursor: &str) -> Result<Url> {
        let mut url = start
            .join(cursor)
            .map_err(|e| SyncError::InvalidCursor(format!("{cursor}: {e}")))?;

        if self.client.force_https_cursors() && url.scheme() == "http" {
            url.set_scheme("https")
                .map_err(|_| SyncError::InvalidCursor(cursor.to_string()))?;
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::testing::MockTransport;
    use serde_json::json;

    fn client(mock: MockTransport, force_https: bool) -> ApiClient<MockTransport> {
        let config = ClientConfig::new()
            .with_base_url("http://paperless.local/api")
            .with_token("t0k3n")
            .with_force_https_cursors(force_https)
            .validate()
            .unwrap();
        ApiClient::new(mock, config)
    }

    #[tokio::test]
    async fn relative_cursor_resolves_against_start() {
        let mock = MockTransport::new()
            .with_json(
                "http://paperless.local/api/documents/",
                json!({"results": [{"id": 1}], "next": "/api/documents/?page=2"}),
            )
            .with_json(
                "http://paperless.local/api/documents/?page=2",
                json!({"results": [{"id": 2}], "next": null}),
            );
        let client = client(mock.clone(), false);
        let start = client.endpoints().documents.clone();

        let items = PageFetcher::new(&client).fetch_all(&start).await.unwrap();

        assert_eq!(items, vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn force_https_rewrites_http_cursors() {
        let mock = MockTransport::new()
            .with_json(
                "http://paperless.local/api/documents/",
                json!({"results": [{"id": 1}], "next": "http://paperless.local/api/documents/?page=2"}),
            )
            .with_json(
                "https://paperless.local/api/documents/?page=2",
                json!([{"id": 2}]),
            );
        let client = client(mock.clone(), true);
        let start = client.endpoints().documents.clone();

        let items = PageFetcher::new(&client).fetch_all(&start).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(
            mock.requested_urls()[1],
            "https://paperless.local/api/documents/?page=2"
        );
    }

    #[tokio::test]
    async fn cursor_pointing_back_is_rejected() {
        let mock = MockTransport::new().with_json(
            "http://paperless.local/api/documents/",
            json!({"results": [{"id": 1}], "next": "http://paperless.local/api/documents/"}),
        );
        let client = client(mock.clone(), false);
        let start = client.endpoints().documents.clone();

        let err = PageFetcher::new(&client).fetch_all(&start).await.unwrap_err();

        assert!(matches!(err, SyncError::CursorLoop(_)));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn failing_page_fails_the_drain() {
        let mock = MockTransport::new()
            .with_json(
                "http://paperless.local/api/documents/",
                json!({"results": [{"id": 1}], "next": "?page=2"}),
            )
            .with_error(
                "http://paperless.local/api/documents/?page=2",
                SyncError::Api {
                    status: 500,
                    message: "boom".into(),
                },
            );
        let client = client(mock, false);
        let start = client.endpoints().documents.clone();

        let err = PageFetcher::new(&client).fetch_all(&start).await.unwrap_err();
        assert!(err.is_api());
    }
}
