//! Published coordinator state.
//!
//! State lives in a `tokio::sync::watch` channel: readers take snapshots or
//! subscribe and await changes, and every mutation is a single
//! `send_modify` so subscribers see each transition.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

use crate::catalog::CatalogKind;
use crate::error::SyncError;
use crate::types::{CatalogEntry, Document};

/// Everything a presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState {
    pub documents: Vec<Document>,
    pub catalogs: BTreeMap<CatalogKind, Vec<CatalogEntry>>,
    pub is_loading: bool,
    #[serde(serialize_with = "serialize_error")]
    pub last_error: Option<SyncError>,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            catalogs: CatalogKind::ALL.iter().map(|k| (*k, Vec::new())).collect(),
            is_loading: false,
            last_error: None,
        }
    }
}

impl FetchState {
    pub fn catalog(&self, kind: CatalogKind) -> &[CatalogEntry] {
        self.catalogs.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<SyncError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Owner of the published state.
#[derive(Debug)]
pub(crate) struct StateStore {
    tx: watch::Sender<FetchState>,
    in_flight: AtomicUsize,
    #[cfg(test)]
    pub(crate) loading_starts: AtomicUsize,
}

impl StateStore {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(FetchState::default());
        Self {
            tx,
            in_flight: AtomicUsize::new(0),
            #[cfg(test)]
            loading_starts: AtomicUsize::new(0),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> FetchState {
        self.tx.borrow().clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&FetchState) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub(crate) fn clear_error(&self) {
        self.tx.send_if_modified(|s| s.last_error.take().is_some());
    }

    pub(crate) fn set_documents(&self, documents: Vec<Document>) {
        self.tx.send_modify(|s| s.documents = documents);
    }

    pub(crate) fn fail_documents(&self, error: SyncError) {
        self.tx.send_modify(|s| {
            s.documents.clear();
            s.last_error = Some(error);
        });
    }

    pub(crate) fn set_catalog(&self, kind: CatalogKind, entries: Vec<CatalogEntry>) {
        self.tx.send_modify(|s| {
            s.catalogs.insert(kind, entries);
        });
    }

    pub(crate) fn fail_catalog(&self, kind: CatalogKind, error: SyncError) {
        self.tx.send_modify(|s| {
            s.catalogs.insert(kind, Vec::new());
            s.last_error = Some(error);
        });
    }

    /// Mark an operation as running until the guard drops.
    pub(crate) fn begin_loading(&self) -> LoadingGuard<'_> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            #[cfg(test)]
            self.loading_starts.fetch_add(1, Ordering::SeqCst);
            self.tx
                .send_if_modified(|s| !std::mem::replace(&mut s.is_loading, true));
        }
        LoadingGuard { store: self }
    }
}

/// Keeps `is_loading` set while alive; nested guards share one flag.
pub(crate) struct LoadingGuard<'a> {
    store: &'a StateStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.store.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.store
                .tx
                .send_if_modified(|s| std::mem::replace(&mut s.is_loading, false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_empty_with_every_catalog_present() {
        let state = FetchState::default();
        assert!(state.documents.is_empty());
        assert!(!state.is_loading);
        assert!(state.last_error.is_none());
        for kind in CatalogKind::ALL {
            assert!(state.catalog(kind).is_empty());
        }
    }

    #[test]
    fn nested_loading_guards_share_the_flag() {
        let store = StateStore::new();

        let outer = store.begin_loading();
        let inner = store.begin_loading();
        drop(inner);
        assert!(store.snapshot().is_loading);

        drop(outer);
        assert!(!store.snapshot().is_loading);
        assert_eq!(store.loading_starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_clears_collection_and_records_error() {
        let store = StateStore::new();
        store.set_documents(vec![Document::from(json!({"id": 1}))]);
        store.fail_documents(SyncError::Network("down".into()));

        let state = store.snapshot();
        assert!(state.documents.is_empty());
        assert_eq!(state.last_error, Some(SyncError::Network("down".into())));

        store.clear_error();
        assert!(store.snapshot().last_error.is_none());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = StateStore::new();
        let mut rx = store.subscribe();

        store.set_catalog(CatalogKind::Tag, vec![CatalogEntry::new(1, "Urgent")]);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().catalog(CatalogKind::Tag).len(), 1);
    }

    #[test]
    fn serializes_error_as_message() {
        let state = FetchState {
            last_error: Some(SyncError::Config("PAPERLESS_TOKEN is not set".into())),
            ..FetchState::default()
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value["last_error"],
            json!("Configuration error: PAPERLESS_TOKEN is not set")
        );
        assert_eq!(value["catalogs"]["document_type"], json!([]));
    }
}
