//! Error types for the Paperless sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that abort a fetch operation.
///
/// Cloneable so the coordinator can keep the last one in its published
/// state. Per-identifier lookup failures are not represented here; see
/// [`ResolutionFailure`](crate::resolver::ResolutionFailure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Configuration error (missing base URL or token)
    #[error("Configuration error: {0}")]
    Config(String),

    /// API error (non-2xx response)
    #[error("Paperless API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network error (connection failed, body could not be read)
    #[error("Network error: {0}")]
    Network(String),

    /// Parse error (response body is not JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A `next` cursor could not be resolved to a URL
    #[error("invalid pagination cursor: {0}")]
    InvalidCursor(String),

    /// A `next` cursor pointed back at a page already fetched
    #[error("pagination cursor loops back to {0}")]
    CursorLoop(String),

    /// Collation data for catalog ordering could not be loaded
    #[error("Collation error: {0}")]
    Collation(String),

    /// The same operation is already running on this coordinator
    #[error("{0} fetch already in flight")]
    InFlight(&'static str),
}

impl SyncError {
    /// Whether this error came from the remote API rejecting a request.
    pub fn is_api(&self) -> bool {
        matches!(self, SyncError::Api { .. })
    }

    /// Whether this error is a configuration problem.
    pub fn is_config(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }
}
