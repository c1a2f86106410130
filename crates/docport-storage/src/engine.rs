//! Embedded document engine.
//!
//! A [`DocumentStore`] hands out named [`Collection`]s; a collection supports
//! point lookups, whole-document upserts and deletes, and unique single-field
//! indexes. [`KvDocumentStore`] implements both traits on top of a
//! [`KvStore`]:
//!
//! | Namespace | Key | Value |
//! |-----------|-----|-------|
//! | `doc␟{collection}` | `_id` | document JSON |
//! | `idx␟{collection}␟{field}` | index key of the field value | `_id` |
//! | `meta␟{collection}` | indexed field name | `unique` |
//!
//! (`␟` is the ASCII unit separator, which collection and field names may
//! not contain.)

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::document::{Document, Filter, ID_FIELD, UpdateOptions, UpdateOutcome, index_key};
use crate::error::{StorageError, StorageResult};
use crate::kv::{KvStore, MemoryKvStore, ScopedKvStore};

/// Path that opens a fresh in-memory store instead of touching the disk.
pub const MEMORY_PATH: &str = ":memory:";

const SEP: char = '\u{1f}';
const INDEX_KIND_UNIQUE: &[u8] = b"unique";

/// A named group of documents.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Collection name.
    fn name(&self) -> &str;

    /// Create a unique index on `field` if it does not exist yet.
    ///
    /// Documents without the field are not indexed.
    async fn ensure_index(&self, field: &str) -> StorageResult<()>;

    /// First document matching `filter`, including its `_id`.
    async fn find_one(&self, filter: &Filter) -> StorageResult<Option<Document>>;

    /// Replace the first document matching `filter` with `document`, or
    /// insert it when nothing matches and `options.upsert` is set.
    async fn update_one(
        &self,
        filter: &Filter,
        document: Document,
        options: UpdateOptions,
    ) -> StorageResult<UpdateOutcome>;

    /// Delete the first document matching `filter`. `false` if none matched.
    async fn delete_one(&self, filter: &Filter) -> StorageResult<bool>;

    /// Number of documents in the collection.
    async fn count(&self) -> StorageResult<u64>;
}

/// An opened document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get a handle to the named collection, creating it on first write.
    async fn collection(&self, name: &str) -> StorageResult<Arc<dyn Collection>>;

    /// Flush pending writes and release the backend. Handles must not be
    /// used afterwards.
    async fn close(&self) -> StorageResult<()>;
}

/// Opens a [`DocumentStore`] at a path.
#[async_trait]
pub trait StoreOpener: Send + Sync {
    /// Open (or create) the store at `path`.
    async fn open(&self, path: &Path) -> StorageResult<Arc<dyn DocumentStore>>;
}

/// Opener for [`KvDocumentStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KvStoreOpener;

#[async_trait]
impl StoreOpener for KvStoreOpener {
    async fn open(&self, path: &Path) -> StorageResult<Arc<dyn DocumentStore>> {
        Ok(Arc::new(KvDocumentStore::open(path)?))
    }
}

fn validate_name(kind: &str, name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidKey(format!("{kind} must not be empty")));
    }
    if name.contains('\0') || name.contains(SEP) {
        return Err(StorageError::InvalidKey(format!(
            "{kind} {name:?} contains a reserved character"
        )));
    }
    Ok(())
}

/// Index registry shared by every handle of one collection.
#[derive(Debug, Default)]
struct CollectionState {
    indexed: BTreeSet<String>,
}

/// Document store over any [`KvStore`].
pub struct KvDocumentStore {
    kv: Arc<dyn KvStore>,
    states: Mutex<HashMap<String, Arc<RwLock<CollectionState>>>>,
}

impl std::fmt::Debug for KvDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvDocumentStore").finish_non_exhaustive()
    }
}

impl KvDocumentStore {
    /// Open the store at `path`.
    ///
    /// [`MEMORY_PATH`] yields an empty in-memory store. Any other path is a
    /// `SurrealKV` directory, created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the path exists but is not a
    /// directory, or if the backend cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if path == Path::new(MEMORY_PATH) {
            return Ok(Self::in_memory());
        }
        if path.exists() && !path.is_dir() {
            return Err(StorageError::Connection(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        Self::open_persistent(path)
    }

    #[cfg(feature = "kv")]
    fn open_persistent(path: &Path) -> StorageResult<Self> {
        let kv = crate::kv::SurrealKvStore::open(path)?;
        debug!(path = %path.display(), "opened SurrealKV document store");
        Ok(Self::with_kv_store(Arc::new(kv)))
    }

    #[cfg(not(feature = "kv"))]
    fn open_persistent(path: &Path) -> StorageResult<Self> {
        Err(StorageError::Connection(format!(
            "cannot open {}: persistent storage requires the `kv` feature",
            path.display()
        )))
    }

    /// An empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_kv_store(Arc::new(MemoryKvStore::new()))
    }

    /// A store over an existing key-value backend.
    #[must_use]
    pub fn with_kv_store(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            states: Mutex::new(HashMap::new()),
        }
    }

    async fn state_for(&self, name: &str) -> StorageResult<Arc<RwLock<CollectionState>>> {
        let mut states = self.states.lock().await;
        if let Some(state) = states.get(name) {
            return Ok(Arc::clone(state));
        }
        let meta = ScopedKvStore::new(Arc::clone(&self.kv), format!("meta{SEP}{name}"))?;
        let indexed = meta.list_keys().await?.into_iter().collect();
        let state = Arc::new(RwLock::new(CollectionState { indexed }));
        states.insert(name.to_owned(), Arc::clone(&state));
        Ok(state)
    }
}

#[async_trait]
impl DocumentStore for KvDocumentStore {
    async fn collection(&self, name: &str) -> StorageResult<Arc<dyn Collection>> {
        validate_name("collection name", name)?;
        let state = self.state_for(name).await?;
        Ok(Arc::new(KvCollection {
            name: name.to_owned(),
            kv: Arc::clone(&self.kv),
            docs: ScopedKvStore::new(Arc::clone(&self.kv), format!("doc{SEP}{name}"))?,
            meta: ScopedKvStore::new(Arc::clone(&self.kv), format!("meta{SEP}{name}"))?,
            state,
        }))
    }

    async fn close(&self) -> StorageResult<()> {
        self.kv.close().await
    }
}

/// Collection handle of a [`KvDocumentStore`].
struct KvCollection {
    name: String,
    kv: Arc<dyn KvStore>,
    docs: ScopedKvStore,
    meta: ScopedKvStore,
    state: Arc<RwLock<CollectionState>>,
}

impl KvCollection {
    fn index(&self, field: &str) -> StorageResult<ScopedKvStore> {
        ScopedKvStore::new(
            Arc::clone(&self.kv),
            format!("idx{SEP}{}{SEP}{field}", self.name),
        )
    }

    fn duplicate(&self, field: &str, value: String) -> StorageError {
        StorageError::DuplicateKey {
            collection: self.name.clone(),
            field: field.to_owned(),
            value,
        }
    }

    /// Locate the first match as `(_id, document)`.
    ///
    /// Uses the index when `filter` targets an indexed field, falls back to a
    /// scan in `_id` order otherwise.
    async fn find_match(
        &self,
        state: &CollectionState,
        filter: &Filter,
    ) -> StorageResult<Option<(String, Document)>> {
        if filter.field() == ID_FIELD {
            let Value::String(id) = filter.value() else {
                return Ok(None);
            };
            return Ok(self
                .docs
                .get_json::<Document>(id)
                .await?
                .map(|doc| (id.clone(), doc)));
        }

        if state.indexed.contains(filter.field()) {
            let Some(owner) = self.index(filter.field())?.get(&filter.index_key()).await? else {
                return Ok(None);
            };
            let id = String::from_utf8(owner)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            return Ok(self
                .docs
                .get_json::<Document>(&id)
                .await?
                .map(|doc| (id, doc)));
        }

        let mut ids = self.docs.list_keys().await?;
        ids.sort();
        for id in ids {
            if let Some(doc) = self.docs.get_json::<Document>(&id).await?
                && filter.matches(&doc)
            {
                return Ok(Some((id, doc)));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl Collection for KvCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ensure_index(&self, field: &str) -> StorageResult<()> {
        if field == ID_FIELD {
            return Ok(());
        }
        validate_name("index field", field)?;

        let mut state = self.state.write().await;
        if state.indexed.contains(field) {
            return Ok(());
        }

        let mut entries: HashMap<String, String> = HashMap::new();
        for id in self.docs.list_keys().await? {
            let Some(doc) = self.docs.get_json::<Document>(&id).await? else {
                continue;
            };
            let Some(value) = doc.get(field) else {
                continue;
            };
            let key = index_key(value);
            if entries.contains_key(&key) {
                return Err(self.duplicate(field, key));
            }
            entries.insert(key, id);
        }

        // Leftovers of an earlier, interrupted build.
        let index = self.index(field)?;
        for stale in index.list_keys().await? {
            index.delete(&stale).await?;
        }
        let count = entries.len();
        for (key, id) in entries {
            index.set(&key, id.into_bytes()).await?;
        }
        self.meta.set(field, INDEX_KIND_UNIQUE.to_vec()).await?;
        state.indexed.insert(field.to_owned());

        debug!(collection = %self.name, field, documents = count, "built unique index");
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> StorageResult<Option<Document>> {
        let state = self.state.read().await;
        Ok(self.find_match(&state, filter).await?.map(|(_, doc)| doc))
    }

    async fn update_one(
        &self,
        filter: &Filter,
        mut document: Document,
        options: UpdateOptions,
    ) -> StorageResult<UpdateOutcome> {
        let state = self.state.write().await;

        let (id, previous) = match self.find_match(&state, filter).await? {
            Some((id, previous)) => (id, Some(previous)),
            None if options.upsert => (uuid::Uuid::new_v4().to_string(), None),
            None => return Ok(UpdateOutcome::default()),
        };
        let upserted = previous.is_none();
        document.insert(ID_FIELD.to_owned(), Value::String(id.clone()));

        for field in &state.indexed {
            let Some(value) = document.get(field) else {
                continue;
            };
            let key = index_key(value);
            if let Some(owner) = self.index(field)?.get(&key).await?
                && owner != id.as_bytes()
            {
                return Err(self.duplicate(field, key));
            }
        }

        self.docs.set_json(&id, &document).await?;

        for field in &state.indexed {
            let index = self.index(field)?;
            let old = previous.as_ref().and_then(|p| p.get(field)).map(index_key);
            let new = document.get(field).map(index_key);
            if let Some(old) = old.filter(|old| Some(old) != new.as_ref()) {
                index.delete(&old).await?;
            }
            if let Some(new) = new {
                index.set(&new, id.clone().into_bytes()).await?;
            }
        }

        Ok(UpdateOutcome {
            matched: u64::from(!upserted),
            upserted,
        })
    }

    async fn delete_one(&self, filter: &Filter) -> StorageResult<bool> {
        let state = self.state.write().await;
        let Some((id, doc)) = self.find_match(&state, filter).await? else {
            return Ok(false);
        };
        for field in &state.indexed {
            if let Some(value) = doc.get(field) {
                self.index(field)?.delete(&index_key(value)).await?;
            }
        }
        self.docs.delete(&id).await
    }

    async fn count(&self) -> StorageResult<u64> {
        let _state = self.state.read().await;
        Ok(self.docs.list_keys().await?.len() as u64)
    }
}
