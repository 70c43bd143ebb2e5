//! Client configuration and endpoint derivation.
//!
//! The access token is wrapped with the `secrecy` crate so it never shows up
//! in logs, debug output, or error messages.

use secrecy::{ExposeSecret, SecretBox};
use std::env;
use std::fmt;
use url::Url;

use crate::error::{Result, SyncError};

const ENV_BASE_URL: &str = "PAPERLESS_API_URL";
const ENV_TOKEN: &str = "PAPERLESS_TOKEN";
const ENV_FORCE_HTTPS: &str = "PAPERLESS_FORCE_HTTPS_CURSORS";

/// A Paperless API token that won't be logged or displayed.
pub struct ApiToken(SecretBox<str>);

impl ApiToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the token for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl Clone for ApiToken {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for ApiToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Connection settings for a Paperless instance.
///
/// Both fields are optional here so that a coordinator can still be built
/// from an incomplete environment; validation happens once in
/// [`ClientConfig::validate`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// API root, e.g. `https://paperless.example.com/api`
    pub base_url: Option<String>,

    /// Access token sent as `Authorization: Token <token>`
    pub token: Option<ApiToken>,

    /// Rewrite `http:` pagination cursors to `https:`
    pub force_https_cursors: bool,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `.env` if present. Missing variables are left unset rather than
    /// failing here.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            base_url: env::var(ENV_BASE_URL).ok(),
            token: env::var(ENV_TOKEN).ok().map(ApiToken::from),
            force_https_cursors: env::var(ENV_FORCE_HTTPS)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<ApiToken>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_force_https_cursors(mut self, enabled: bool) -> Self {
        self.force_https_cursors = enabled;
        self
    }

    /// Check that both the base URL and the token are present and derive the
    /// API endpoints.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let raw_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SyncError::Config(format!("{ENV_BASE_URL} is not set")))?;

        let token = self
            .token
            .as_ref()
            .filter(|t| !t.is_blank())
            .cloned()
            .ok_or_else(|| SyncError::Config(format!("{ENV_TOKEN} is not set")))?;

        let endpoints = Endpoints::from_base(raw_url)?;

        Ok(ValidatedConfig {
            endpoints,
            token,
            force_https_cursors: self.force_https_cursors,
        })
    }
}

/// Configuration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub endpoints: Endpoints,
    pub token: ApiToken,
    pub force_https_cursors: bool,
}

/// Collection endpoints derived from the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base: Url,
    pub documents: Url,
    pub document_types: Url,
    pub tags: Url,
}

impl Endpoints {
    /// Derive endpoints from an API root. A trailing `/` is added when
    /// missing so that the collection paths join below it.
    pub fn from_base(raw: &str) -> Result<Self> {
        let mut base = Url::parse(raw)
            .map_err(|e| SyncError::Config(format!("invalid {ENV_BASE_URL} '{raw}': {e}")))?;

        if base.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "{ENV_BASE_URL} '{raw}' cannot be used as a base URL"
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        let join = |path: &str| {
            base.join(path)
                .map_err(|e| SyncError::Config(format!("cannot derive {path} endpoint: {e}")))
        };

        Ok(Self {
            documents: join("documents/")?,
            document_types: join("document_types/")?,
            tags: join("tags/")?,
            base,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_redacted() {
        let token = ApiToken::new("super-secret");
        assert_eq!(format!("{:?}", token), "[REDACTED]");
        assert_eq!(format!("{}", token), "[REDACTED]");
        assert_eq!(token.expose(), "super-secret");
    }

    #[test]
    fn config_debug_does_not_leak_token() {
        let config = ClientConfig::new()
            .with_base_url("https://paperless.local/api")
            .with_token("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn endpoints_absorb_trailing_slash() {
        let with = Endpoints::from_base("https://paperless.local/api/").unwrap();
        let without = Endpoints::from_base("https://paperless.local/api").unwrap();

        assert_eq!(with, without);
        assert_eq!(with.documents.as_str(), "https://paperless.local/api/documents/");
        assert_eq!(
            with.document_types.as_str(),
            "https://paperless.local/api/document_types/"
        );
        assert_eq!(with.tags.as_str(), "https://paperless.local/api/tags/");
    }

    #[test]
    fn missing_token_fails_validation() {
        let err = ClientConfig::new()
            .with_base_url("https://paperless.local/api")
            .validate()
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("PAPERLESS_TOKEN"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = ClientConfig::new()
            .with_base_url("   ")
            .with_token("abc")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("PAPERLESS_API_URL"));

        let err = ClientConfig::new()
            .with_base_url("https://paperless.local/api")
            .with_token("  ")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("PAPERLESS_TOKEN"));
    }

    #[test]
    fn unparseable_base_url_is_a_config_error() {
        let err = ClientConfig::new()
            .with_base_url("not a url")
            .with_token("abc")
            .validate()
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
