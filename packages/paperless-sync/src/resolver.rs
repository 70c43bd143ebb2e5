//! Resolves referenced identifiers to canonical `{id, name}` records.
//!
//! Each identifier is looked up on its own (`?id=<value>`) and all lookups
//! run concurrently. A failed lookup only drops that identifier: it is
//! logged and reported back as a [`ResolutionFailure`], never as an error of
//! the whole batch.

use futures::future::join_all;
use indexmap::IndexSet;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::catalog::CatalogKind;
use crate::client::{with_query, ApiClient};
use crate::error::{Result, SyncError};
use crate::transport::Transport;
use crate::types::{CatalogEntry, Identifier, QueryParams};

const NAME_KEYS: [&str; 3] = ["name", "title", "label"];

/// Why one identifier could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionFailure {
    pub kind: CatalogKind,
    pub id: Identifier,
    pub reason: String,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.id, self.reason)
    }
}

/// Outcome of resolving a batch of identifiers.
///
/// `resolved` has one slot per requested identifier, in request order;
/// unresolved identifiers hold `None` and appear in `failures`.
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    pub resolved: Vec<Option<CatalogEntry>>,
    pub failures: Vec<ResolutionFailure>,
}

/// Read a lookup record into a catalog entry.
///
/// The record's own `id` wins when it is a scalar; `fallback_id` is used
/// otherwise. Returns `None` when no non-blank name is present.
pub fn entry_from_record(record: &Value, fallback_id: &Identifier) -> Option<CatalogEntry> {
    let obj = record.as_object()?;

    let id = obj
        .get("id")
        .and_then(Identifier::from_scalar)
        .unwrap_or_else(|| fallback_id.clone());

    let name = NAME_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))?
        .trim();

    if name.is_empty() {
        return None;
    }

    Some(CatalogEntry::new(id, name))
}

/// Looks identifiers up against one catalog kind's endpoint.
pub struct EntityResolver<'a, T> {
    client: &'a ApiClient<T>,
    kind: CatalogKind,
}

impl<'a, T: Transport> EntityResolver<'a, T> {
    pub fn new(client: &'a ApiClient<T>, kind: CatalogKind) -> Self {
        Self { client, kind }
    }

    /// Resolve every identifier, waiting for all lookups to settle.
    pub async fn resolve(&self, ids: &IndexSet<Identifier>) -> ResolutionReport {
        let lookups = ids.iter().map(|id| async move { (id, self.lookup(id).await) });
        let results = join_all(lookups).await;

        let mut report = ResolutionReport {
            resolved: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };

        for (id, result) in results {
            match result {
                Ok(entry) => report.resolved.push(Some(entry)),
                Err(e) => {
                    let failure = ResolutionFailure {
                        kind: self.kind,
                        id: id.clone(),
                        reason: e.to_string(),
                    };
                    warn!(
                        kind = %failure.kind,
                        id = %failure.id,
                        error = %failure.reason,
                        "Failed to resolve catalog entry"
                    );
                    report.resolved.push(None);
                    report.failures.push(failure);
                }
            }
        }

        debug!(
            kind = %self.kind,
            requested = ids.len(),
            failed = report.failures.len(),
            "Resolution complete"
        );
        report
    }

    async fn lookup(&self, id: &Identifier) -> Result<CatalogEntry> {
        let endpoint = self.kind.endpoint(self.client.endpoints());
        let url = with_query(endpoint, &QueryParams::new().with("id", id));

        let record = self
            .client
            .get_page(&url)
            .await?
            .into_first_record()
            .ok_or_else(|| SyncError::Parse(format!("no {} record returned", self.kind)))?;

        entry_from_record(&record, id)
            .ok_or_else(|| SyncError::Parse(format!("{} record has no usable name", self.kind)))
    }
}
