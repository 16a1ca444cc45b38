//! Document store port: schemaless persistence keyed by collection.
//!
//! Every entity kind lives in the collection named after it. Documents are
//! handed back exactly as stored, identifier under the native `_id` key;
//! services normalize them before they leave the application layer.

use std::future::Future;
use std::sync::Arc;

use infratree_domain::document::Document;
use infratree_domain::error::InfraTreeError;
use infratree_domain::filter::Filter;
use infratree_domain::id::ObjectId;

/// Generic document store the hierarchy engine runs on.
///
/// Implementations must return exactly the documents [`Filter::matches`]
/// accepts, in insertion order.
pub trait DocumentStore {
    /// Insert `document` into `collection` under a freshly generated
    /// identifier and return it. Any `_id` on the input is ignored.
    fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> impl Future<Output = Result<ObjectId, InfraTreeError>> + Send;

    /// First document matching `filter`.
    fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Option<Document>, InfraTreeError>> + Send;

    /// Every document matching `filter`.
    fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<Document>, InfraTreeError>> + Send;

    /// Merge the top-level keys of `set` into the first document matching
    /// `filter`. Returns the number of matched documents (0 or 1).
    fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> impl Future<Output = Result<u64, InfraTreeError>> + Send;

    /// Delete the first document matching `filter`. Returns the number of
    /// deleted documents (0 or 1).
    fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64, InfraTreeError>> + Send;
}

impl<T: DocumentStore + Send + Sync> DocumentStore for Arc<T> {
    fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> impl Future<Output = Result<ObjectId, InfraTreeError>> + Send {
        (**self).insert_one(collection, document)
    }

    fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Option<Document>, InfraTreeError>> + Send {
        (**self).find_one(collection, filter)
    }

    fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<Document>, InfraTreeError>> + Send {
        (**self).find_many(collection, filter)
    }

    fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> impl Future<Output = Result<u64, InfraTreeError>> + Send {
        (**self).update_one(collection, filter, set)
    }

    fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64, InfraTreeError>> + Send {
        (**self).delete_one(collection, filter)
    }
}
