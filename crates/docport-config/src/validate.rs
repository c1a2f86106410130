//! Configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::ConnectorConfig;

const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a deserialized configuration.
///
/// A missing `path` is not a validation failure here: the store location may
/// still come from the command line, and the connector rejects its absence.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &ConnectorConfig) -> ConfigResult<()> {
    validate_routing(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_routing(config: &ConnectorConfig) -> ConfigResult<()> {
    if let Some(split) = &config.split_char
        && split.is_empty()
    {
        return Err(invalid(
            "split_char",
            "must not be empty; omit it to disable key splitting",
        ));
    }

    let name = &config.default_collection;
    if name.is_empty() {
        return Err(invalid("default_collection", "must not be empty"));
    }
    if name.contains('\0') || name.contains('\u{1f}') {
        return Err(invalid(
            "default_collection",
            format!("{name:?} contains a reserved character"),
        ));
    }
    if let Some(split) = &config.split_char
        && name.contains(split.as_str())
    {
        return Err(invalid(
            "default_collection",
            format!("{name:?} must not contain the split character {split:?}"),
        ));
    }

    if let Some(path) = &config.path
        && path.as_os_str().is_empty()
    {
        return Err(invalid("path", "must not be empty"));
    }
    Ok(())
}

fn validate_logging(config: &ConnectorConfig) -> ConfigResult<()> {
    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported format '{}'; expected one of: {}",
                config.logging.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }
    if config.logging.level.trim().is_empty() {
        return Err(invalid("logging.level", "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate(&ConnectorConfig::default()).is_ok());
        assert!(validate(&ConnectorConfig::new(":memory:").with_split_char("/")).is_ok());
    }

    #[test]
    fn test_empty_split_char_rejected() {
        let config = ConnectorConfig::new("/data").with_split_char("");
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "split_char"
        ));
    }

    #[test]
    fn test_default_collection_must_not_contain_split_char() {
        let config = ConnectorConfig::new("/data")
            .with_split_char("/")
            .with_default_collection("a/b");
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "default_collection"
        ));
    }

    #[test]
    fn test_empty_default_collection_rejected() {
        let config = ConnectorConfig::new("/data").with_default_collection("");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = ConnectorConfig::new("/data");
        config.logging.format = "xml".to_owned();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "logging.format"
        ));
    }
}
