//! Paperless document sync and reference catalogs.
//!
//! Keeps a local view of a Paperless REST API: drains the paginated
//! documents endpoint into one list, then builds sorted, deduplicated
//! catalogs of the document types and tags those documents reference.
//!
//! # Example
//!
//! ```rust,ignore
//! use paperless_sync::{CatalogKind, ClientConfig, FetchCoordinator, QueryParams};
//!
//! let config = ClientConfig::new()
//!     .with_base_url("https://paperless.example.com/api")
//!     .with_token("your-api-token");
//! let coordinator = FetchCoordinator::new(config);
//!
//! // Watch state from a UI task
//! let mut rx = coordinator.subscribe();
//!
//! coordinator
//!     .fetch_documents(QueryParams::new().with("title__icontains", "invoice"))
//!     .await?;
//! let report = coordinator
//!     .fetch_catalog(CatalogKind::Tag, QueryParams::new())
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - [`pager`] - Follows `next` cursors across pages
//! - [`reference`] - Collects referenced identifiers from documents
//! - [`resolver`] - Concurrent per-identifier lookups with failure isolation
//! - [`catalog`] - Dedup and locale-aware ordering of resolved entries
//! - [`coordinator`] - Public operations over published state
//! - [`testing`] - Mock transport for tests

pub mod catalog;
pub mod client;
pub mod collation;
pub mod config;
pub mod coordinator;
pub mod envelope;
pub mod error;
pub mod pager;
pub mod reference;
pub mod resolver;
pub mod state;
pub mod testing;
pub mod transport;
pub mod types;

pub use catalog::{aggregate, CatalogKind};
pub use client::ApiClient;
pub use collation::NameCollator;
pub use config::{ApiToken, ClientConfig, Endpoints, ValidatedConfig};
pub use coordinator::{CatalogReport, FetchCoordinator};
pub use envelope::Page;
pub use error::{Result, SyncError};
pub use pager::PageFetcher;
pub use reference::{extract_references, parse_reference, Cardinality, ReferenceField};
pub use resolver::{EntityResolver, ResolutionFailure, ResolutionReport};
pub use state::FetchState;
pub use transport::{HttpTransport, Transport};
pub use types::{CatalogEntry, Document, Identifier, QueryParams};
