//! Configuration types.
//!
//! Every struct implements [`Default`] so that an empty TOML file yields a
//! usable configuration (apart from `path`, which has no default and is
//! checked when the connector is constructed).

use std::path::PathBuf;

use serde::Deserialize;

/// Collection used for keys that carry no collection part.
pub const DEFAULT_COLLECTION: &str = "docport_docs";

/// Connector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Store location. `":memory:"` selects a throwaway in-memory store.
    pub path: Option<PathBuf>,
    /// Delimiter between collection name and id inside a key. `None`
    /// routes every key to the default collection.
    #[serde(alias = "splitChar")]
    pub split_char: Option<String>,
    /// Collection for single-part keys.
    #[serde(alias = "defaultCollection")]
    pub default_collection: String,
    /// Logging level and format.
    pub logging: LoggingSection,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            path: None,
            split_char: None,
            default_collection: DEFAULT_COLLECTION.to_owned(),
            logging: LoggingSection::default(),
        }
    }
}

impl ConnectorConfig {
    /// Configuration for the store at `path`, everything else default.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Set the key delimiter.
    #[must_use]
    pub fn with_split_char(mut self, split_char: impl Into<String>) -> Self {
        self.split_char = Some(split_char.into());
        self
    }

    /// Set the default collection.
    #[must_use]
    pub fn with_default_collection(mut self, name: impl Into<String>) -> Self {
        self.default_collection = name.into();
        self
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Filter directive, e.g. `"info"` or `"docport_connector=debug"`.
    pub level: String,
    /// One of `pretty`, `compact`, `json`, `full`.
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
        }
    }
}
