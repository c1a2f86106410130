//! Connector error types.

use std::sync::Arc;

use docport_config::ConfigError;
use docport_storage::StorageError;

/// Errors returned by the connector.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The configuration names no store location.
    #[error("Missing setting 'path'")]
    MissingPath,

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The connector was created outside a Tokio runtime.
    #[error("connector must be created inside a Tokio runtime")]
    NoRuntime,

    /// The key does not resolve to a collection and id.
    #[error("Invalid key {key}")]
    InvalidKey {
        /// The offending key, as given.
        key: String,
    },

    /// The store has not finished opening, or failed to open.
    #[error("connector is not ready")]
    NotReady,

    /// The store could not be opened.
    #[error("connection failed: {0}")]
    Connection(Arc<StorageError>),

    /// The engine rejected an operation.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ConnectorError {
    pub(crate) fn invalid_key(key: &str) -> Self {
        Self::InvalidKey {
            key: key.to_owned(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
