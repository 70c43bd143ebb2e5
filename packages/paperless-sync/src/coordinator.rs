//! Orchestrates document fetches and catalog builds over shared state.

use std::time::Instant;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::catalog::{aggregate, CatalogKind};
use crate::client::{with_query, ApiClient};
use crate::config::ClientConfig;
use crate::error::{Result, SyncError};
use crate::pager::PageFetcher;
use crate::reference::extract_references;
use crate::resolver::{EntityResolver, ResolutionFailure};
use crate::state::{FetchState, StateStore};
use crate::transport::{HttpTransport, Transport};
use crate::types::{CatalogEntry, Document, Identifier, QueryParams};

/// Result of a catalog build.
///
/// `entries` is what was published; `failures` lists identifiers that were
/// referenced but could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogReport {
    pub entries: Vec<CatalogEntry>,
    pub failures: Vec<ResolutionFailure>,
}

/// State container for one Paperless instance.
///
/// Holds the documents list, per-kind catalogs, the loading flag, and the
/// last error. Each operation kind is single-flight: a second call while one
/// is running returns [`SyncError::InFlight`] and leaves the state alone.
///
/// # Example
///
/// ```rust,ignore
/// use paperless_sync::{CatalogKind, ClientConfig, FetchCoordinator, QueryParams};
///
/// let coordinator = FetchCoordinator::new(ClientConfig::from_env());
///
/// coordinator.fetch_documents(QueryParams::new()).await?;
/// let report = coordinator
///     .fetch_catalog(CatalogKind::DocumentType, QueryParams::new())
///     .await?;
/// for entry in &report.entries {
///     println!("{} {}", entry.id, entry.name);
/// }
/// ```
pub struct FetchCoordinator<T = HttpTransport> {
    client: std::result::Result<ApiClient<T>, SyncError>,
    state: StateStore,
    documents_flight: Mutex<()>,
    document_types_flight: Mutex<()>,
    tags_flight: Mutex<()>,
}

impl FetchCoordinator<HttpTransport> {
    /// Create a coordinator talking HTTP via `reqwest`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: Transport> FetchCoordinator<T> {
    /// Create a coordinator over a custom transport.
    ///
    /// The configuration is validated here, once. An invalid configuration
    /// does not prevent construction; every operation then fails with the
    /// stored configuration error without issuing a request.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let client = config.validate().map(|valid| ApiClient::new(transport, valid));
        if let Err(e) = &client {
            warn!(error = %e, "Paperless client is not configured");
        }

        Self {
            client,
            state: StateStore::new(),
            documents_flight: Mutex::new(()),
            document_types_flight: Mutex::new(()),
            tags_flight: Mutex::new(()),
        }
    }

    /// Configuration error recorded at construction, if any.
    pub fn config_error(&self) -> Option<&SyncError> {
        self.client.as_ref().err()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> FetchState {
        self.state.snapshot()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.state.read(|s| s.documents.clone())
    }

    pub fn catalog(&self, kind: CatalogKind) -> Vec<CatalogEntry> {
        self.state.read(|s| s.catalog(kind).to_vec())
    }

    pub fn is_loading(&self) -> bool {
        self.state.read(|s| s.is_loading)
    }

    pub fn last_error(&self) -> Option<SyncError> {
        self.state.read(|s| s.last_error.clone())
    }

    /// Replace `documents` with every document matching `params`.
    ///
    /// Returns the number of documents stored. On failure the documents list
    /// is cleared and the error recorded as `last_error`.
    pub async fn fetch_documents(&self, params: QueryParams) -> Result<usize> {
        let _flight = self
            .documents_flight
            .try_lock()
            .map_err(|_| SyncError::InFlight("documents"))?;
        self.load_documents(&params).await
    }

    /// Fetch only documents whose `kind` reference equals `id`.
    ///
    /// Without an id, or with a blank one, this is an unfiltered
    /// [`fetch_documents`](Self::fetch_documents).
    pub async fn fetch_documents_by_reference(
        &self,
        kind: CatalogKind,
        id: Option<Identifier>,
    ) -> Result<usize> {
        let id = id.filter(|id| !id.key().trim().is_empty());
        let params = QueryParams::new().with_opt(kind.filter_key(), id);
        self.fetch_documents(params).await
    }

    /// Rebuild the catalog of `kind` from the referenced identifiers.
    ///
    /// Documents are refetched first when `params` is non-empty or no
    /// documents are loaded yet. Lookups that fail are dropped from the
    /// catalog and listed in the report; they never set `last_error`.
    pub async fn fetch_catalog(
        &self,
        kind: CatalogKind,
        params: QueryParams,
    ) -> Result<CatalogReport> {
        let _flight = self
            .catalog_flight(kind)
            .try_lock()
            .map_err(|_| SyncError::InFlight(kind.label()))?;

        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Catalog fetch failed");
                self.state.fail_catalog(kind, e.clone());
                return Err(e);
            }
        };

        let _loading = self.state.begin_loading();
        self.state.clear_error();

        match self.build_catalog(client, kind, &params).await {
            Ok(report) => {
                info!(
                    kind = %kind,
                    entries = report.entries.len(),
                    unresolved = report.failures.len(),
                    "Catalog updated"
                );
                self.state.set_catalog(kind, report.entries.clone());
                Ok(report)
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "Catalog fetch failed");
                self.state.fail_catalog(kind, e.clone());
                Err(e)
            }
        }
    }

    fn catalog_flight(&self, kind: CatalogKind) -> &Mutex<()> {
        match kind {
            CatalogKind::DocumentType => &self.document_types_flight,
            CatalogKind::Tag => &self.tags_flight,
        }
    }

    fn client(&self) -> Result<&ApiClient<T>> {
        self.client.as_ref().map_err(Clone::clone)
    }

    async fn build_catalog(
        &self,
        client: &ApiClient<T>,
        kind: CatalogKind,
        params: &QueryParams,
    ) -> Result<CatalogReport> {
        let needs_refresh = !params.is_empty() || self.state.read(|s| s.documents.is_empty());
        if needs_refresh {
            // waits for a running documents fetch instead of rejecting
            let _flight = self.documents_flight.lock().await;
            self.load_documents(params).await?;
        }

        let ids = self.state.read(|s| extract_references(&s.documents, &kind.reference_field()));
        let report = EntityResolver::new(client, kind).resolve(&ids).await;

        Ok(CatalogReport {
            entries: aggregate(report.resolved)?,
            failures: report.failures,
        })
    }

    /// Drain the documents endpoint into state. Caller holds the documents
    /// single-flight guard.
    async fn load_documents(&self, params: &QueryParams) -> Result<usize> {
        // a configuration failure never marks the state as loading
        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Documents fetch failed");
                self.state.fail_documents(e.clone());
                return Err(e);
            }
        };

        let _loading = self.state.begin_loading();
        self.state.clear_error();
        let started = Instant::now();

        let url = with_query(&client.endpoints().documents, params);
        match PageFetcher::new(client).fetch_all(&url).await {
            Ok(items) => {
                let documents: Vec<Document> = items.into_iter().map(Document::from).collect();
                let count = documents.len();
                info!(
                    documents = count,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Documents fetched"
                );
                self.state.set_documents(documents);
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Documents fetch failed");
                self.state.fail_documents(e.clone());
                Err(e)
            }
        }
    }
}
