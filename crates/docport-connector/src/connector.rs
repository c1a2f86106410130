//! The connector: key-addressed `set`/`get`/`delete` over a document store.

use std::sync::Arc;

use docport_config::ConnectorConfig;
use docport_storage::{Collection, Document, Filter, KvStoreOpener, StoreOpener, UpdateOptions};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::error::{ConnectorError, ConnectorResult};
use crate::lifecycle::{ConnectionState, Lifecycle};
use crate::router::{CollectionCache, DS_KEY, HIDDEN_FIELDS, KeyRouter};

/// Storage connector.
///
/// Cheap to clone; clones share the store, the collection cache and the
/// connection state.
#[derive(Clone)]
pub struct Connector {
    inner: Arc<Inner>,
}

struct Inner {
    lifecycle: Arc<Lifecycle>,
    router: KeyRouter,
    cache: CollectionCache,
    runtime: Handle,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("router", &self.inner.router)
            .field("state", &self.inner.lifecycle.state())
            .finish_non_exhaustive()
    }
}

impl Connector {
    /// Create a connector over the store at `config.path`.
    ///
    /// Returns immediately in [`ConnectionState::Opening`]; the store is
    /// opened by a background task. Observe the outcome with
    /// [`ready`](Self::ready), [`subscribe`](Self::subscribe) or
    /// [`state`](Self::state).
    ///
    /// # Errors
    ///
    /// - [`ConnectorError::MissingPath`] if `config.path` is unset
    /// - [`ConnectorError::Config`] if the configuration is invalid
    /// - [`ConnectorError::NoRuntime`] outside a Tokio runtime
    pub fn new(config: ConnectorConfig) -> ConnectorResult<Self> {
        Self::with_opener(config, Arc::new(KvStoreOpener))
    }

    /// Like [`new`](Self::new), opening the store through `opener`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_opener(
        config: ConnectorConfig,
        opener: Arc<dyn StoreOpener>,
    ) -> ConnectorResult<Self> {
        let path = config.path.clone().ok_or(ConnectorError::MissingPath)?;
        docport_config::validate::validate(&config)?;
        let runtime = Handle::try_current().map_err(|_| ConnectorError::NoRuntime)?;

        let lifecycle = Arc::new(Lifecycle::new());
        let opening = Arc::clone(&lifecycle);
        runtime.spawn(async move {
            let outcome = opener.open(&path).await;
            match &outcome {
                Ok(_) => debug!(path = %path.display(), "store opened"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to open store"),
            }
            opening.complete(outcome);
        });

        Ok(Self {
            inner: Arc::new(Inner {
                lifecycle,
                router: KeyRouter::new(config.split_char, config.default_collection),
                cache: CollectionCache::default(),
                runtime,
            }),
        })
    }

    /// Crate name, for host registries.
    #[must_use]
    pub fn name(&self) -> &'static str {
        env!("CARGO_PKG_NAME")
    }

    /// Crate version.
    #[must_use]
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.lifecycle.state()
    }

    /// Whether the store is open.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Watch the connection state. It changes at most once.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.lifecycle.subscribe()
    }

    /// Wait until the store has opened.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Connection`] if opening failed.
    pub async fn ready(&self) -> ConnectorResult<()> {
        self.inner.lifecycle.wait().await
    }

    /// The key router in use.
    #[must_use]
    pub fn router(&self) -> &KeyRouter {
        &self.inner.router
    }

    /// Store `document` under `key`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::InvalidKey`], [`ConnectorError::NotReady`], or the
    /// engine's error as [`ConnectorError::Storage`].
    pub async fn set(&self, key: &str, mut document: Document) -> ConnectorResult<()> {
        let (collection, id) = self.target(key).await?;
        trace!(key, collection = collection.name(), "set");
        document.insert(DS_KEY.to_owned(), Value::String(id.to_owned()));
        collection
            .update_one(&Filter::eq(DS_KEY, id), document, UpdateOptions::upsert())
            .await?;
        Ok(())
    }

    /// Fetch the document stored under `key`. `Ok(None)` if there is none.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::InvalidKey`], [`ConnectorError::NotReady`], or the
    /// engine's error as [`ConnectorError::Storage`].
    pub async fn get(&self, key: &str) -> ConnectorResult<Option<Document>> {
        let (collection, id) = self.target(key).await?;
        trace!(key, collection = collection.name(), "get");
        let found = collection.find_one(&Filter::eq(DS_KEY, id)).await?;
        Ok(found.map(strip_hidden))
    }

    /// Delete the document stored under `key`. Deleting nothing is not an
    /// error.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::InvalidKey`], [`ConnectorError::NotReady`], or the
    /// engine's error as [`ConnectorError::Storage`].
    pub async fn delete(&self, key: &str) -> ConnectorResult<()> {
        let (collection, id) = self.target(key).await?;
        trace!(key, collection = collection.name(), "delete");
        collection.delete_one(&Filter::eq(DS_KEY, id)).await?;
        Ok(())
    }

    /// Flush and release the store. Issue no operations afterwards. Does
    /// nothing unless the store is open.
    ///
    /// # Errors
    ///
    /// Returns the engine's error as [`ConnectorError::Storage`].
    pub async fn close(&self) -> ConnectorResult<()> {
        let Some(store) = self.inner.lifecycle.store() else {
            return Ok(());
        };
        store.close().await?;
        debug!("store closed");
        Ok(())
    }

    async fn target<'a>(
        &'a self,
        key: &'a str,
    ) -> ConnectorResult<(Arc<dyn Collection>, &'a str)> {
        let route = self.inner.router.route(key)?;
        let store = self
            .inner
            .lifecycle
            .store()
            .ok_or(ConnectorError::NotReady)?;
        let collection = self
            .inner
            .cache
            .resolve(store.as_ref(), route.collection, &self.inner.runtime)
            .await?;
        Ok((collection, route.id))
    }
}

/// Drop storage bookkeeping fields from a document.
fn strip_hidden(document: Document) -> Document {
    document
        .into_iter()
        .filter(|(field, _)| !HIDDEN_FIELDS.contains(&field.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_hidden() {
        let doc = json!({"_id": "x", "ds_key": "42", "name": "Ann", "id": 7});
        let stripped = strip_hidden(doc.as_object().unwrap().clone());
        assert_eq!(Value::Object(stripped), json!({"name": "Ann", "id": 7}));
    }

    #[test]
    fn test_new_outside_runtime() {
        let err = Connector::new(ConnectorConfig::new(":memory:")).unwrap_err();
        assert!(matches!(err, ConnectorError::NoRuntime));
    }

    #[test]
    fn test_missing_path_checked_first() {
        let err = Connector::new(ConnectorConfig::default()).unwrap_err();
        assert!(matches!(err, ConnectorError::MissingPath));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ConnectorConfig::new(":memory:").with_default_collection("");
        let err = Connector::new(config).unwrap_err();
        assert!(matches!(err, ConnectorError::Config(_)));
    }

    #[tokio::test]
    async fn test_identity() {
        let connector = Connector::new(ConnectorConfig::new(":memory:")).unwrap();
        assert_eq!(connector.name(), "docport-connector");
        assert!(!connector.version().is_empty());
    }
}
