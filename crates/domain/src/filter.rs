//! Equality filters over documents.
//!
//! A [`Filter`] is a conjunction of `field == value` clauses. Field names may
//! be dotted paths (`attributes.color`) reaching into sub-documents. Stores
//! may push clauses down to their query language, but must return exactly
//! the documents [`Filter::matches`] accepts.

use serde_json::Value;

use crate::document::{Document, NAME, NATIVE_ID, PARENT_ID, SLUG};
use crate::id::ObjectId;

/// Conjunction of equality clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// The filter matching every document.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match the document with the given native identifier.
    #[must_use]
    pub fn by_id(id: ObjectId) -> Self {
        Self::all().eq(NATIVE_ID, id.to_hex())
    }

    #[must_use]
    pub fn by_name(name: &str) -> Self {
        Self::all().eq(NAME, name)
    }

    #[must_use]
    pub fn by_slug(slug: &str) -> Self {
        Self::all().eq(SLUG, slug)
    }

    /// Match children whose `parentId` equals `parent_id`.
    #[must_use]
    pub fn by_parent(parent_id: &str) -> Self {
        Self::all().eq(PARENT_ID, parent_id)
    }

    /// Build a filter from a query document; every top-level key becomes a
    /// clause.
    #[must_use]
    pub fn from_document(query: Document) -> Self {
        Self {
            clauses: query.into_iter().collect(),
        }
    }

    /// Add a clause.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The identifier this filter pins, if it has an `_id` clause.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.clauses
            .iter()
            .find(|(field, _)| field == NATIVE_ID)
            .and_then(|(_, value)| value.as_str())
    }

    /// Whether `doc` satisfies every clause.
    ///
    /// A `null` clause matches both an explicit `null` and a missing field.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| match lookup(doc, field) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            })
    }
}

/// Resolve a dotted path inside a document.
#[must_use]
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    if let Some(value) = doc.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::from_value;

    fn rack() -> Document {
        from_value(json!({
            "_id": "00000000000000000000000000000001",
            "name": "R1",
            "parentId": "room-1",
            "attributes": {"orientation": "front", "height": 42}
        }))
        .unwrap()
    }

    #[test]
    fn should_match_everything_when_empty() {
        assert!(Filter::all().matches(&rack()));
    }

    #[test]
    fn should_match_all_clauses() {
        let filter = Filter::by_name("R1").eq(PARENT_ID, "room-1");
        assert!(filter.matches(&rack()));

        let filter = Filter::by_name("R1").eq(PARENT_ID, "room-2");
        assert!(!filter.matches(&rack()));
    }

    #[test]
    fn should_follow_dotted_paths() {
        assert!(Filter::all().eq("attributes.orientation", "front").matches(&rack()));
        assert!(Filter::all().eq("attributes.height", 42).matches(&rack()));
        assert!(!Filter::all().eq("attributes.color", "red").matches(&rack()));
    }

    #[test]
    fn should_treat_null_clause_as_missing_field() {
        assert!(Filter::all().eq("domain", Value::Null).matches(&rack()));
        assert!(!Filter::all().eq("name", Value::Null).matches(&rack()));
    }

    #[test]
    fn should_expose_pinned_id() {
        let id = ObjectId::new();
        assert_eq!(Filter::by_id(id).id(), Some(id.to_hex().as_str()));
        assert_eq!(Filter::by_name("x").id(), None);
    }

    #[test]
    fn should_build_clauses_from_query_document() {
        let query = from_value(json!({"name": "R1", "category": "rack"})).unwrap();
        let filter = Filter::from_document(query);
        assert_eq!(filter.clauses().len(), 2);
        assert!(!filter.matches(&rack()));
    }
}
