//! Transport bound to a validated configuration.

use url::Url;

use crate::config::{Endpoints, ValidatedConfig};
use crate::envelope::Page;
use crate::error::Result;
use crate::transport::Transport;
use crate::types::QueryParams;

/// A transport bound to a validated Paperless configuration.
pub struct ApiClient<T> {
    transport: T,
    config: ValidatedConfig,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: ValidatedConfig) -> Self {
        Self { transport, config }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.config.endpoints
    }

    pub fn force_https_cursors(&self) -> bool {
        self.config.force_https_cursors
    }

    /// GET `url` and parse the body into a [`Page`].
    pub async fn get_page(&self, url: &Url) -> Result<Page> {
        let payload = self
            .transport
            .get_json(url, self.config.token.expose())
            .await?;
        Ok(Page::parse(payload))
    }
}

/// `endpoint` with `params` appended as query pairs.
pub fn with_query(endpoint: &Url, params: &QueryParams) -> Url {
    let mut url = endpoint.clone();
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params.iter() {
            pairs.append_pair(key, value);
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_query_encodes_pairs() {
        let endpoint = Url::parse("https://paperless.local/api/documents/").unwrap();
        let params = QueryParams::new()
            .with("document_type__id", 3)
            .with("title__icontains", "tax 2024");

        let url = with_query(&endpoint, &params);
        assert_eq!(
            url.as_str(),
            "https://paperless.local/api/documents/?document_type__id=3&title__icontains=tax+2024"
        );
    }

    #[test]
    fn empty_params_leave_url_untouched() {
        let endpoint = Url::parse("https://paperless.local/api/tags/").unwrap();
        assert_eq!(with_query(&endpoint, &QueryParams::new()), endpoint);
    }
}
