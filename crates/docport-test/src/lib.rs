//! Docport Test - shared test utilities.
//!
//! Add to a crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! docport-test.workspace = true
//! ```
//!
//! The main tool is [`RecordingStore`], a [`DocumentStore`] wrapper that logs
//! every engine call so tests can assert that an operation reached the
//! engine, or that it did not.
//!
//! [`DocumentStore`]: docport_storage::DocumentStore

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
