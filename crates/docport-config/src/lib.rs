#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Configuration for the docport connector.
//!
//! ```rust,no_run
//! use docport_config::ConnectorConfig;
//!
//! let config = ConnectorConfig::load_file(std::path::Path::new("docport.toml")).unwrap();
//! println!("store at {:?}", config.path);
//! ```
//!
//! # Sources
//!
//! From highest to lowest priority:
//!
//! 1. Values set in the TOML file (or string)
//! 2. Environment variables (`DOCPORT_*`), filling unset fields only
//! 3. Built-in defaults
//!
//! Hosts layer their own overrides (command-line flags) on top.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::{ConnectorConfig, DEFAULT_COLLECTION, LoggingSection};

impl ConnectorConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the string cannot be parsed or fails
    /// validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        loader::from_toml_str(content)
    }

    /// Configuration from `DOCPORT_*` environment variables and defaults
    /// only.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the resulting configuration fails
    /// validation.
    pub fn from_env() -> ConfigResult<Self> {
        loader::from_toml_str("")
    }
}
