//! Docport Telemetry - logging setup for hosts embedding the connector.
//!
//! The library crates only emit `tracing` events; a host decides where they
//! go by calling [`setup_logging`] once at startup.
//!
//! ```rust,no_run
//! use docport_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), docport_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("docport_connector=debug");
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
