//! Environment variable fallbacks.
//!
//! A variable only fills a field the TOML source left unset; it never
//! overrides an explicit value.

use std::collections::HashMap;

use tracing::debug;

/// `(variable, section, key)`; an empty section means the root table.
const ENV_FALLBACKS: &[(&str, &str, &str)] = &[
    ("DOCPORT_PATH", "", "path"),
    ("DOCPORT_SPLIT_CHAR", "", "split_char"),
    ("DOCPORT_DEFAULT_COLLECTION", "", "default_collection"),
    ("DOCPORT_LOG_LEVEL", "logging", "level"),
];

/// Keys accepted under another spelling; a value under either counts as set.
const ALIASES: &[(&str, &str)] = &[
    ("split_char", "splitChar"),
    ("default_collection", "defaultCollection"),
];

/// Snapshot of the `DOCPORT_*` environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("DOCPORT_"))
        .collect()
}

/// Fill unset fields of `tree` from `env`. Returns how many were applied.
pub fn apply_env_fallbacks(tree: &mut toml::Value, env: &HashMap<String, String>) -> usize {
    let Some(root) = tree.as_table_mut() else {
        return 0;
    };

    let mut applied = 0usize;
    for (var, section, key) in ENV_FALLBACKS {
        let Some(value) = env.get(*var) else {
            continue;
        };

        let table = if section.is_empty() {
            &mut *root
        } else {
            let entry = root
                .entry((*section).to_owned())
                .or_insert(toml::Value::Table(toml::map::Map::new()));
            let Some(table) = entry.as_table_mut() else {
                continue;
            };
            table
        };

        let alias = ALIASES
            .iter()
            .find(|(canonical, _)| canonical == key)
            .map(|(_, alias)| *alias);
        if table.contains_key(*key) || alias.is_some_and(|a| table.contains_key(a)) {
            continue;
        }

        table.insert((*key).to_owned(), toml::Value::String(value.clone()));
        debug!(var = %var, "applied environment fallback");
        applied = applied.saturating_add(1);
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_fills_missing_fields() {
        let mut tree: toml::Value = toml::from_str("").unwrap();
        let applied = apply_env_fallbacks(
            &mut tree,
            &env(&[("DOCPORT_PATH", "/data"), ("DOCPORT_LOG_LEVEL", "debug")]),
        );
        assert_eq!(applied, 2);
        assert_eq!(tree["path"].as_str(), Some("/data"));
        assert_eq!(tree["logging"]["level"].as_str(), Some("debug"));
    }

    #[test]
    fn test_explicit_values_win() {
        let mut tree: toml::Value =
            toml::from_str("path = \"/explicit\"\nsplitChar = \"/\"").unwrap();
        let applied = apply_env_fallbacks(
            &mut tree,
            &env(&[("DOCPORT_PATH", "/env"), ("DOCPORT_SPLIT_CHAR", ":")]),
        );
        assert_eq!(applied, 0);
        assert_eq!(tree["path"].as_str(), Some("/explicit"));
        assert!(tree.get("split_char").is_none());
    }
}
