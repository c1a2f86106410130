//! Config file loading.
//!
//! 1. Read the TOML source (files are capped at [`MAX_CONFIG_FILE_SIZE`])
//! 2. Apply `DOCPORT_*` fallbacks for unset fields
//! 3. Deserialize into [`ConnectorConfig`]
//! 4. Validate

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::ConnectorConfig;
use crate::validate;

/// Maximum allowed config file size (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load a config file, with environment fallbacks from the process env.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<ConnectorConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Check size after reading to avoid TOCTOU between stat and read.
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len(),
            ),
        });
    }

    let config = parse(&content, &path.display().to_string(), &collect_env_vars())?;
    info!(path = %path.display(), "loaded connector config");
    Ok(config)
}

/// Parse a TOML string, with environment fallbacks from the process env.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the string cannot be parsed or fails
/// validation.
pub fn from_toml_str(content: &str) -> ConfigResult<ConnectorConfig> {
    parse(content, "<string>", &collect_env_vars())
}

/// Parse `content` against an explicit environment snapshot.
///
/// `origin` names the source in error messages.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the content cannot be parsed or fails
/// validation.
pub fn parse(
    content: &str,
    origin: &str,
    env: &HashMap<String, String>,
) -> ConfigResult<ConnectorConfig> {
    let mut tree: toml::Value = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })?;

    let applied = apply_env_fallbacks(&mut tree, env);
    if applied > 0 {
        debug!(count = applied, "applied environment variable fallbacks");
    }

    let config: ConnectorConfig =
        tree.try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: origin.to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;
    Ok(config)
}
