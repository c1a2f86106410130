//! Bridge from `docport_config` to the connector and telemetry types.

use std::path::PathBuf;

use docport_config::{ConnectorConfig, LoggingSection};
use docport_telemetry::{LogConfig, LogFormat};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Store location.
    pub path: Option<PathBuf>,
    /// Key delimiter.
    pub split_char: Option<String>,
    /// Collection for single-part keys.
    pub default_collection: Option<String>,
}

/// Apply `overrides` on top of `config`.
#[must_use]
pub fn apply_overrides(mut config: ConnectorConfig, overrides: Overrides) -> ConnectorConfig {
    if let Some(path) = overrides.path {
        config.path = Some(path);
    }
    if let Some(split_char) = overrides.split_char {
        config.split_char = Some(split_char);
    }
    if let Some(name) = overrides.default_collection {
        config.default_collection = name;
    }
    config
}

/// Convert the `[logging]` section to a [`LogConfig`].
///
/// `verbose` forces the `debug` level.
#[must_use]
pub fn to_log_config(logging: &LoggingSection, verbose: bool) -> LogConfig {
    let format = logging.format.parse().unwrap_or(LogFormat::Compact);
    let level = if verbose { "debug" } else { logging.level.as_str() };
    LogConfig::new(level).with_format(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let config = ConnectorConfig::new("/from/file").with_split_char(":");
        let config = apply_overrides(
            config,
            Overrides {
                path: Some("/from/flag".into()),
                split_char: None,
                default_collection: Some("things".into()),
            },
        );
        assert_eq!(config.path, Some(PathBuf::from("/from/flag")));
        assert_eq!(config.split_char.as_deref(), Some(":"));
        assert_eq!(config.default_collection, "things");
    }

    #[test]
    fn test_to_log_config() {
        let logging = LoggingSection {
            level: "warn".into(),
            format: "json".into(),
        };
        let log = to_log_config(&logging, false);
        assert_eq!(log.level, "warn");
        assert_eq!(log.format, LogFormat::Json);

        assert_eq!(to_log_config(&logging, true).level, "debug");
    }

    #[test]
    fn test_unknown_format_falls_back_to_compact() {
        let logging = LoggingSection {
            level: "info".into(),
            format: "xml".into(),
        };
        assert_eq!(to_log_config(&logging, false).format, LogFormat::Compact);
    }
}
