//! Docport Storage - the embedded document engine behind the connector.
//!
//! Two layers:
//!
//! # Key-value ([`KvStore`])
//!
//! Namespaced byte-level `get`/`set`/`delete`. [`MemoryKvStore`] is always
//! available; [`SurrealKvStore`] (feature **`kv`**, on by default) persists
//! to an embedded, ACID `SurrealKV` tree.
//!
//! # Documents ([`DocumentStore`], [`Collection`])
//!
//! JSON documents grouped in named collections, each with an engine-assigned
//! `_id`, point lookups by field equality, whole-document upserts and unique
//! single-field indexes. [`KvDocumentStore`] implements this on top of any
//! [`KvStore`].
//!
//! ```rust
//! use docport_storage::{DocumentStore, Filter, KvDocumentStore, UpdateOptions};
//!
//! # async fn example() -> docport_storage::StorageResult<()> {
//! let store = KvDocumentStore::open(docport_storage::MEMORY_PATH)?;
//! let users = store.collection("users").await?;
//! users.ensure_index("ds_key").await?;
//!
//! let mut doc = docport_storage::Document::new();
//! doc.insert("ds_key".into(), "42".into());
//! users
//!     .update_one(&Filter::eq("ds_key", "42"), doc, UpdateOptions::upsert())
//!     .await?;
//! assert!(users.find_one(&Filter::eq("ds_key", "42")).await?.is_some());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod document;
pub mod engine;
pub mod error;
pub mod kv;

pub use document::{Document, Filter, ID_FIELD, UpdateOptions, UpdateOutcome};
pub use engine::{
    Collection, DocumentStore, KvDocumentStore, KvStoreOpener, MEMORY_PATH, StoreOpener,
};
pub use error::{StorageError, StorageResult};
pub use kv::{KvStore, MemoryKvStore, ScopedKvStore};

#[cfg(feature = "kv")]
pub use kv::SurrealKvStore;
