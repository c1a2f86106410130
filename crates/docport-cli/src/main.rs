//! Docport CLI - read and write documents in a docport store.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use docport_config::ConnectorConfig;
use docport_connector::Connector;
use serde_json::Value;
use tracing::debug;

pub mod config_bridge;

use config_bridge::Overrides;

/// Docport - key-addressed document storage
#[derive(Parser)]
#[command(name = "docport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "DOCPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Store location (`:memory:` for a throwaway store)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Delimiter between collection and id in keys
    #[arg(long, global = true)]
    split_char: Option<String>,

    /// Collection for keys without a delimiter
    #[arg(long, global = true)]
    default_collection: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a JSON object under a key
    Set {
        /// Document key
        key: String,
        /// Document as a JSON object
        json: String,
    },

    /// Print the document stored under a key, or `null`
    Get {
        /// Document key
        key: String,
    },

    /// Delete the document stored under a key
    Delete {
        /// Document key
        key: String,
    },
}

fn load_config(cli: &Cli) -> Result<ConnectorConfig> {
    let config = match &cli.config {
        Some(path) => ConnectorConfig::load_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ConnectorConfig::from_env()?,
    };
    Ok(config_bridge::apply_overrides(
        config,
        Overrides {
            path: cli.path.clone(),
            split_char: cli.split_char.clone(),
            default_collection: cli.default_collection.clone(),
        },
    ))
}

fn parse_document(json: &str) -> Result<docport_connector::Document> {
    let value: Value = serde_json::from_str(json).context("document is not valid JSON")?;
    let Value::Object(document) = value else {
        bail!("document must be a JSON object");
    };
    Ok(document)
}

async fn run(connector: &Connector, command: Commands) -> Result<()> {
    match command {
        Commands::Set { key, json } => {
            let document = parse_document(&json)?;
            connector.set(&key, document).await?;
        },
        Commands::Get { key } => {
            let output = match connector.get(&key).await? {
                Some(document) => serde_json::to_string_pretty(&Value::Object(document))?,
                None => "null".to_owned(),
            };
            println!("{output}");
        },
        Commands::Delete { key } => {
            connector.delete(&key).await?;
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    let log_config = config_bridge::to_log_config(&config.logging, cli.verbose);
    if let Err(e) = docport_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let connector = Connector::new(config)?;
    connector.ready().await?;
    debug!(
        connector = connector.name(),
        version = connector.version(),
        "store ready"
    );

    let outcome = run(&connector, cli.command).await;
    connector.close().await?;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set() {
        let cli = Cli::try_parse_from([
            "docport",
            "--path",
            ":memory:",
            "--split-char",
            "/",
            "set",
            "users/42",
            r#"{"name":"Ann"}"#,
        ])
        .unwrap();
        assert_eq!(cli.path, Some(PathBuf::from(":memory:")));
        assert_eq!(cli.split_char.as_deref(), Some("/"));
        assert!(matches!(cli.command, Commands::Set { ref key, .. } if key == "users/42"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["docport", "get", "k", "-v", "--default-collection", "d"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.default_collection.as_deref(), Some("d"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["docport"]).is_err());
    }

    #[test]
    fn test_parse_document() {
        let doc = parse_document(r#"{"a": 1}"#).unwrap();
        assert_eq!(doc.get("a"), Some(&Value::from(1)));
        assert!(parse_document("[1, 2]").is_err());
        assert!(parse_document("{").is_err());
    }

    #[tokio::test]
    async fn test_run_against_memory_store() {
        let config = ConnectorConfig::new(":memory:").with_split_char("/");
        let connector = Connector::new(config).unwrap();
        connector.ready().await.unwrap();

        run(
            &connector,
            Commands::Set {
                key: "users/1".into(),
                json: r#"{"name":"Ann"}"#.into(),
            },
        )
        .await
        .unwrap();
        assert!(connector.get("users/1").await.unwrap().is_some());

        run(
            &connector,
            Commands::Delete {
                key: "users/1".into(),
            },
        )
        .await
        .unwrap();
        assert!(connector.get("users/1").await.unwrap().is_none());

        let err = run(&connector, Commands::Get { key: "a/b/c".into() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid key a/b/c");
    }
}
