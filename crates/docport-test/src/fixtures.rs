//! Test fixtures.

use docport_storage::Document;

/// Build a [`Document`] from a `serde_json::json!` object literal.
///
/// # Panics
///
/// Panics if `value` is not a JSON object.
#[must_use]
pub fn test_document(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("test_document expects a JSON object, got {other}"),
    }
}

/// A small user document.
#[must_use]
pub fn test_user(name: &str) -> Document {
    test_document(serde_json::json!({ "name": name }))
}
