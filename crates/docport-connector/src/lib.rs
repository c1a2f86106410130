//! Docport Connector - key-addressed document storage.
//!
//! A [`Connector`] maps string keys onto documents in an embedded
//! [`DocumentStore`](docport_storage::DocumentStore). With a split character
//! configured, `"users/42"` addresses document `42` in collection `users`; a
//! key without the split character goes to the default collection.
//!
//! ```rust,no_run
//! use docport_config::ConnectorConfig;
//! use docport_connector::Connector;
//! use serde_json::json;
//!
//! # async fn example() -> docport_connector::ConnectorResult<()> {
//! let config = ConnectorConfig::new("/var/lib/docport").with_split_char("/");
//! let connector = Connector::new(config)?;
//! connector.ready().await?;
//!
//! let doc = json!({"name": "Ann"}).as_object().cloned().unwrap_or_default();
//! connector.set("users/42", doc).await?;
//! assert!(connector.get("users/42").await?.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! Stored documents carry a `ds_key` field with their id and an `_id`
//! assigned by the engine. Neither is ever returned by [`Connector::get`].

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod connector;
pub mod error;
pub mod lifecycle;
pub mod router;

pub use connector::Connector;
pub use docport_storage::{Document, KvStoreOpener, StoreOpener};
pub use error::{ConnectorError, ConnectorResult};
pub use lifecycle::ConnectionState;
pub use router::{DS_KEY, HIDDEN_FIELDS, KeyRouter, Route};
