//! Schemaless documents and the Identifier Normalizer.
//!
//! Stores hand documents back under their native identifier key `_id`.
//! Nothing outside the storage boundary ever sees that key: every read goes
//! through [`normalize`], which renames it to `id`.

use serde_json::{Map, Value};

/// A stored entity: field name to JSON value.
pub type Document = Map<String, Value>;

/// Identifier key used by the backing store.
pub const NATIVE_ID: &str = "_id";
/// Identifier key exposed to callers.
pub const ID: &str = "id";
/// Reference to the parent document (hex identifier).
pub const PARENT_ID: &str = "parentId";
/// Key holding assembled children in hierarchy output.
pub const CHILDREN: &str = "children";
pub const NAME: &str = "name";
pub const SLUG: &str = "slug";

/// Rename the native identifier key to `id`.
///
/// A document without a native key is returned untouched.
#[must_use]
pub fn normalize(mut doc: Document) -> Document {
    if let Some(id) = doc.remove(NATIVE_ID) {
        doc.insert(ID.to_string(), id);
    }
    doc
}

/// Remove both identifier keys so callers cannot choose or rewrite them.
#[must_use]
pub fn strip_ids(mut doc: Document) -> Document {
    doc.remove(NATIVE_ID);
    doc.remove(ID);
    doc
}

/// Read a top-level string field.
#[must_use]
pub fn str_field<'a>(doc: &'a Document, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

/// The exposed `id` of a normalized document.
#[must_use]
pub fn id_of(doc: &Document) -> Option<&str> {
    str_field(doc, ID)
}

/// Elements of a nested array field. Non-document elements and a missing or
/// non-array field are skipped.
#[must_use]
pub fn nested_elements(doc: &Document, field: &str) -> Vec<Document> {
    doc.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// Build a document from a JSON value, rejecting anything but an object.
#[must_use]
pub fn from_value(value: Value) -> Option<Document> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        from_value(value).unwrap()
    }

    #[test]
    fn should_rename_native_id_to_id() {
        let normalized = normalize(doc(json!({"_id": "abc", "name": "R1"})));
        assert_eq!(id_of(&normalized), Some("abc"));
        assert!(!normalized.contains_key(NATIVE_ID));
        assert_eq!(str_field(&normalized, NAME), Some("R1"));
    }

    #[test]
    fn should_leave_document_without_native_id_untouched() {
        let original = doc(json!({"id": "abc"}));
        assert_eq!(normalize(original.clone()), original);
    }

    #[test]
    fn should_strip_both_identifier_keys() {
        let stripped = strip_ids(doc(json!({"_id": 1, "id": 2, "name": "x"})));
        assert_eq!(stripped.len(), 1);
        assert!(stripped.contains_key(NAME));
    }

    #[test]
    fn should_read_nested_elements_and_skip_garbage() {
        let parent = doc(json!({"tiles": [{"id": "a"}, 3, {"id": "b"}]}));
        let tiles = nested_elements(&parent, "tiles");
        assert_eq!(tiles.len(), 2);
        assert_eq!(id_of(&tiles[1]), Some("b"));
        assert!(nested_elements(&parent, "cabinets").is_empty());
    }

    #[test]
    fn should_reject_non_object_values() {
        assert!(from_value(json!([1, 2])).is_none());
        assert!(from_value(json!("text")).is_none());
    }
}
