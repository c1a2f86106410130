//! Document, filter and update types shared by engine and callers.

use serde_json::Value;

/// A stored record: field name to arbitrary JSON value.
pub type Document = serde_json::Map<String, Value>;

/// Field holding the engine-assigned identity of a document.
pub const ID_FIELD: &str = "_id";

/// Single-field equality match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    field: String,
    value: Value,
}

impl Filter {
    /// Match documents whose `field` equals `value`.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The field being matched.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The expected value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether `doc` satisfies this filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }

    /// The index key this filter would look up.
    #[must_use]
    pub fn index_key(&self) -> String {
        index_key(&self.value)
    }
}

/// Options for [`Collection::update_one`](crate::Collection::update_one).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Insert the document when nothing matches.
    pub upsert: bool,
}

impl UpdateOptions {
    /// Options with upsert enabled.
    #[must_use]
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

/// What an update did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of documents that matched the filter (0 or 1).
    pub matched: u64,
    /// Whether a new document was inserted.
    pub upserted: bool,
}

/// Key under which a field value is stored in a unique index.
///
/// The compact JSON text of the value: `"1"` and `1` stay distinct, and the
/// result is never empty and never carries a raw NUL byte.
#[must_use]
pub fn index_key(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_exact_value() {
        let doc = json!({"ds_key": "42", "n": 1});
        let doc = doc.as_object().unwrap();
        assert!(Filter::eq("ds_key", "42").matches(doc));
        assert!(!Filter::eq("ds_key", 42).matches(doc));
        assert!(!Filter::eq("missing", "42").matches(doc));
    }

    #[test]
    fn test_index_key_distinguishes_strings_from_numbers() {
        assert_eq!(index_key(&json!("1")), r#""1""#);
        assert_eq!(index_key(&json!(1)), "1");
        assert_eq!(index_key(&json!("")), r#""""#);
        assert!(!index_key(&json!("a\u{0}b")).contains('\0'));
        assert_eq!(index_key(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
    }
}
