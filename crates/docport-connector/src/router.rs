//! Key routing and the collection cache.

use std::collections::HashMap;
use std::sync::Arc;

use docport_storage::{Collection, DocumentStore, ID_FIELD, StorageResult};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ConnectorError, ConnectorResult};

/// Field holding the document id inside a stored document.
pub const DS_KEY: &str = "ds_key";

/// Bookkeeping fields removed from every document handed back to callers.
pub const HIDDEN_FIELDS: [&str; 2] = [ID_FIELD, DS_KEY];

/// Where a key points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route<'a> {
    /// Target collection.
    pub collection: &'a str,
    /// Document id within the collection.
    pub id: &'a str,
}

/// Splits keys into collection and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRouter {
    split_char: Option<String>,
    default_collection: String,
}

impl KeyRouter {
    /// Router splitting on `split_char`; `None` sends every key to
    /// `default_collection`.
    #[must_use]
    pub fn new(split_char: Option<String>, default_collection: impl Into<String>) -> Self {
        Self {
            split_char: split_char.filter(|s| !s.is_empty()),
            default_collection: default_collection.into(),
        }
    }

    /// Collection used for single-part keys.
    #[must_use]
    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }

    /// Resolve `key`.
    ///
    /// Without a split character every key, even an empty one, routes to
    /// the default collection with the whole key as id. With one, a single
    /// part does the same and two parts are `collection` and `id`; any other
    /// part count, an empty part, or a collection name with a reserved
    /// character is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidKey`] naming `key`.
    pub fn route<'a>(&'a self, key: &'a str) -> ConnectorResult<Route<'a>> {
        let Some(sep) = self.split_char.as_deref() else {
            return Ok(Route {
                collection: &self.default_collection,
                id: key,
            });
        };

        let mut parts = key.split(sep);
        let route = match (parts.next(), parts.next(), parts.next()) {
            (Some(id), None, _) => Route {
                collection: &self.default_collection,
                id,
            },
            (Some(collection), Some(id), None) => Route { collection, id },
            _ => return Err(ConnectorError::invalid_key(key)),
        };

        if route.id.is_empty() || !is_valid_collection(route.collection) {
            return Err(ConnectorError::invalid_key(key));
        }
        Ok(route)
    }
}

fn is_valid_collection(name: &str) -> bool {
    !name.is_empty() && !name.contains(['\0', '\u{1f}'])
}

/// Collections seen so far, by name.
///
/// The lock is held while a new collection is created, so each name is
/// created once and indexed once.
#[derive(Default)]
pub(crate) struct CollectionCache {
    collections: Mutex<HashMap<String, Arc<dyn Collection>>>,
}

impl CollectionCache {
    /// Cached handle for `name`, creating it on first use.
    ///
    /// A new collection gets a `ds_key` index built in the background;
    /// the handle is returned without waiting for it.
    pub(crate) async fn resolve(
        &self,
        store: &dyn DocumentStore,
        name: &str,
        runtime: &Handle,
    ) -> StorageResult<Arc<dyn Collection>> {
        let mut collections = self.collections.lock().await;
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }

        let collection = store.collection(name).await?;
        debug!(collection = name, "created collection");

        let indexing = Arc::clone(&collection);
        runtime.spawn(async move {
            if let Err(e) = indexing.ensure_index(DS_KEY).await {
                warn!(collection = indexing.name(), error = %e, "failed to build ds_key index");
            }
        });

        collections.insert(name.to_owned(), Arc::clone(&collection));
        Ok(collection)
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.collections.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docport_storage::KvDocumentStore;

    fn slash() -> KeyRouter {
        KeyRouter::new(Some("/".into()), "docs")
    }

    fn route_of<'a>(router: &'a KeyRouter, key: &'a str) -> Option<(&'a str, &'a str)> {
        router.route(key).ok().map(|r| (r.collection, r.id))
    }

    #[test]
    fn test_single_part_uses_default_collection() {
        let router = slash();
        assert_eq!(route_of(&router, "solo-key"), Some(("docs", "solo-key")));
    }

    #[test]
    fn test_two_parts() {
        let router = slash();
        assert_eq!(route_of(&router, "users/42"), Some(("users", "42")));
    }

    #[test]
    fn test_three_or_more_parts_invalid() {
        let router = slash();
        for key in ["a/b/c", "a//b", "//"] {
            let err = router.route(key).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid key {key}"));
        }
    }

    #[test]
    fn test_empty_parts_invalid() {
        let router = slash();
        for key in ["", "/", "/x", "x/"] {
            assert!(router.route(key).is_err(), "{key:?} should be invalid");
        }
    }

    #[test]
    fn test_reserved_characters_in_collection_invalid() {
        let router = slash();
        assert!(router.route("a\u{1f}b/1").is_err());
        assert!(router.route("a\0b/1").is_err());
        // Ids are stored as values and may contain anything.
        assert_eq!(route_of(&router, "a/\u{1f}"), Some(("a", "\u{1f}")));
    }

    #[test]
    fn test_no_split_char_keeps_whole_key() {
        let router = KeyRouter::new(None, "docs");
        assert_eq!(route_of(&router, "users/42"), Some(("docs", "users/42")));
        assert_eq!(route_of(&router, "a/b/c"), Some(("docs", "a/b/c")));
        assert_eq!(route_of(&router, ""), Some(("docs", "")));
    }

    #[test]
    fn test_empty_split_char_is_disabled() {
        let router = KeyRouter::new(Some(String::new()), "docs");
        assert_eq!(route_of(&router, "users/42"), Some(("docs", "users/42")));
    }

    #[test]
    fn test_multi_char_split() {
        let router = KeyRouter::new(Some("::".into()), "docs");
        assert_eq!(route_of(&router, "users::42"), Some(("users", "42")));
        assert_eq!(route_of(&router, "users:42"), Some(("docs", "users:42")));
    }

    #[tokio::test]
    async fn test_cache_reuses_handles() {
        let store = KvDocumentStore::in_memory();
        let cache = CollectionCache::default();
        let runtime = Handle::current();

        let a = cache.resolve(&store, "users", &runtime).await.unwrap();
        let b = cache.resolve(&store, "users", &runtime).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        cache.resolve(&store, "orders", &runtime).await.unwrap();
        assert_eq!(cache.len().await, 2);
    }
}
