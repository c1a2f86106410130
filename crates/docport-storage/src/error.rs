//! Storage error types.

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A storage operation failed.
    #[error("storage error: {0}")]
    Internal(String),

    /// The storage backend could not be opened.
    #[error("connection error: {0}")]
    Connection(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The namespace, key or collection name is invalid.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A write would break a unique index.
    #[error("duplicate key in {collection}.{field}: {value}")]
    DuplicateKey {
        /// Collection holding the index.
        collection: String,
        /// Indexed field.
        field: String,
        /// Index key that already belongs to another document.
        value: String,
    },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
