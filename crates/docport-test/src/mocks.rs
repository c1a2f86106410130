//! Mock engine components.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docport_storage::{
    Collection, Document, DocumentStore, Filter, KvDocumentStore, StorageError, StorageResult,
    StoreOpener, UpdateOptions, UpdateOutcome,
};

/// One call that reached the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    /// `DocumentStore::collection`.
    Collection {
        /// Requested collection.
        name: String,
    },
    /// `Collection::ensure_index`.
    EnsureIndex {
        /// Target collection.
        collection: String,
        /// Indexed field.
        field: String,
    },
    /// `Collection::find_one`.
    FindOne {
        /// Target collection.
        collection: String,
        /// Filter used.
        filter: Filter,
    },
    /// `Collection::update_one`.
    UpdateOne {
        /// Target collection.
        collection: String,
        /// Filter used.
        filter: Filter,
        /// Whether upsert was requested.
        upsert: bool,
    },
    /// `Collection::delete_one`.
    DeleteOne {
        /// Target collection.
        collection: String,
        /// Filter used.
        filter: Filter,
    },
    /// `Collection::count`.
    Count {
        /// Target collection.
        collection: String,
    },
    /// `DocumentStore::close`.
    Close,
}

impl EngineCall {
    /// Whether this call reads or writes documents.
    #[must_use]
    pub fn is_data_call(&self) -> bool {
        matches!(
            self,
            Self::FindOne { .. } | Self::UpdateOne { .. } | Self::DeleteOne { .. }
        )
    }
}

type CallLog = Arc<Mutex<Vec<EngineCall>>>;

fn record(log: &CallLog, call: EngineCall) {
    if let Ok(mut guard) = log.lock() {
        guard.push(call);
    }
}

/// A [`DocumentStore`] that forwards to a real store and records every call.
///
/// Clones share the same log and the same underlying store.
#[derive(Clone)]
pub struct RecordingStore {
    inner: Arc<dyn DocumentStore>,
    calls: CallLog,
}

impl std::fmt::Debug for RecordingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingStore")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStore {
    /// Record calls against a fresh in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::wrap(Arc::new(KvDocumentStore::in_memory()))
    }

    /// Record calls against `inner`.
    #[must_use]
    pub fn wrap(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Number of recorded calls satisfying `pred`.
    #[must_use]
    pub fn count_calls(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    /// How often `collection(name)` was requested.
    #[must_use]
    pub fn collection_requests(&self, name: &str) -> usize {
        self.count_calls(|c| matches!(c, EngineCall::Collection { name: n } if n == name))
    }

    /// How often an index was requested on `collection`.
    #[must_use]
    pub fn index_requests(&self, collection: &str) -> usize {
        self.count_calls(
            |c| matches!(c, EngineCall::EnsureIndex { collection: n, .. } if n == collection),
        )
    }

    /// Number of document reads and writes.
    #[must_use]
    pub fn data_calls(&self) -> usize {
        self.count_calls(EngineCall::is_data_call)
    }

    /// An opener that hands out this store.
    #[must_use]
    pub fn opener(&self) -> RecordingOpener {
        RecordingOpener {
            store: self.clone(),
            opened: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn collection(&self, name: &str) -> StorageResult<Arc<dyn Collection>> {
        record(
            &self.calls,
            EngineCall::Collection {
                name: name.to_owned(),
            },
        );
        let inner = self.inner.collection(name).await?;
        Ok(Arc::new(RecordingCollection {
            inner,
            calls: Arc::clone(&self.calls),
        }))
    }

    async fn close(&self) -> StorageResult<()> {
        record(&self.calls, EngineCall::Close);
        self.inner.close().await
    }
}

struct RecordingCollection {
    inner: Arc<dyn Collection>,
    calls: CallLog,
}

impl RecordingCollection {
    fn collection(&self) -> String {
        self.inner.name().to_owned()
    }
}

#[async_trait]
impl Collection for RecordingCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn ensure_index(&self, field: &str) -> StorageResult<()> {
        record(
            &self.calls,
            EngineCall::EnsureIndex {
                collection: self.collection(),
                field: field.to_owned(),
            },
        );
        self.inner.ensure_index(field).await
    }

    async fn find_one(&self, filter: &Filter) -> StorageResult<Option<Document>> {
        record(
            &self.calls,
            EngineCall::FindOne {
                collection: self.collection(),
                filter: filter.clone(),
            },
        );
        self.inner.find_one(filter).await
    }

    async fn update_one(
        &self,
        filter: &Filter,
        document: Document,
        options: UpdateOptions,
    ) -> StorageResult<UpdateOutcome> {
        record(
            &self.calls,
            EngineCall::UpdateOne {
                collection: self.collection(),
                filter: filter.clone(),
                upsert: options.upsert,
            },
        );
        self.inner.update_one(filter, document, options).await
    }

    async fn delete_one(&self, filter: &Filter) -> StorageResult<bool> {
        record(
            &self.calls,
            EngineCall::DeleteOne {
                collection: self.collection(),
                filter: filter.clone(),
            },
        );
        self.inner.delete_one(filter).await
    }

    async fn count(&self) -> StorageResult<u64> {
        record(
            &self.calls,
            EngineCall::Count {
                collection: self.collection(),
            },
        );
        self.inner.count().await
    }
}

/// [`StoreOpener`] returning a [`RecordingStore`] and remembering the paths
/// it was asked to open.
#[derive(Debug, Clone)]
pub struct RecordingOpener {
    store: RecordingStore,
    opened: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingOpener {
    /// Paths passed to `open`, in order.
    #[must_use]
    pub fn opened_paths(&self) -> Vec<PathBuf> {
        self.opened.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl StoreOpener for RecordingOpener {
    async fn open(&self, path: &Path) -> StorageResult<Arc<dyn DocumentStore>> {
        if let Ok(mut guard) = self.opened.lock() {
            guard.push(path.to_path_buf());
        }
        Ok(Arc::new(self.store.clone()))
    }
}

/// [`StoreOpener`] that always fails with a connection error.
#[derive(Debug, Clone)]
pub struct FailingOpener {
    message: String,
}

impl FailingOpener {
    /// Fail with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl StoreOpener for FailingOpener {
    async fn open(&self, _path: &Path) -> StorageResult<Arc<dyn DocumentStore>> {
        Err(StorageError::Connection(self.message.clone()))
    }
}
