//! In-memory [`DocumentStore`] shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use infratree_domain::document::{Document, NATIVE_ID, from_value};
use infratree_domain::error::InfraTreeError;
use infratree_domain::filter::Filter;
use infratree_domain::fixtures;
use infratree_domain::id::ObjectId;
use infratree_domain::kind::Kind;
use infratree_domain::validation::ValidationPolicy;
use serde_json::Value;

use crate::ports::DocumentStore;
use crate::services::{HierarchyService, NestedEntityService};

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    failing_delete: Option<String>,
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Make every later delete of the document with this hex id fail.
    pub(crate) fn fail_delete_of(&self, id: &str) {
        self.inner.lock().unwrap().failing_delete = Some(id.to_string());
    }

    pub(crate) fn count(&self, collection: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }
}

impl DocumentStore for InMemoryStore {
    fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> impl Future<Output = Result<ObjectId, InfraTreeError>> + Send {
        let id = ObjectId::new();
        document.insert(NATIVE_ID.to_string(), Value::String(id.to_hex()));
        let mut inner = self.inner.lock().unwrap();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        async move { Ok(id) }
    }

    fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Option<Document>, InfraTreeError>> + Send {
        let inner = self.inner.lock().unwrap();
        let result = inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)).cloned());
        async move { Ok(result) }
    }

    fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<Document>, InfraTreeError>> + Send {
        let inner = self.inner.lock().unwrap();
        let result: Vec<Document> = inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        async move { Ok(result) }
    }

    fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> impl Future<Output = Result<u64, InfraTreeError>> + Send {
        let mut inner = self.inner.lock().unwrap();
        let target = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| filter.matches(doc)));
        let matched = match target {
            Some(doc) => {
                for (key, value) in set {
                    if key != NATIVE_ID {
                        doc.insert(key, value);
                    }
                }
                1
            }
            None => 0,
        };
        async move { Ok(matched) }
    }

    fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64, InfraTreeError>> + Send {
        let mut inner = self.inner.lock().unwrap();
        let failing =
            inner.failing_delete.is_some() && filter.id() == inner.failing_delete.as_deref();
        let result = if failing {
            Err(InfraTreeError::Storage("injected delete failure".into()))
        } else {
            let docs = inner.collections.entry(collection.to_string()).or_default();
            match docs.iter().position(|doc| filter.matches(doc)) {
                Some(index) => {
                    docs.remove(index);
                    Ok(1)
                }
                None => Ok(0),
            }
        };
        async move { result }
    }
}

pub(crate) fn json_doc(value: Value) -> Document {
    from_value(value).unwrap()
}

/// Flat and nested services sharing one fresh in-memory store.
pub(crate) fn services() -> (
    InMemoryStore,
    HierarchyService<InMemoryStore>,
    NestedEntityService<InMemoryStore>,
) {
    let store = InMemoryStore::default();
    let policy = ValidationPolicy::default();
    let flat = HierarchyService::new(store.clone(), policy.clone());
    let nested = NestedEntityService::new(store.clone(), policy);
    (store, flat, nested)
}

/// Create a valid flat entity and return its hex id.
pub(crate) async fn create(
    flat: &HierarchyService<InMemoryStore>,
    kind: Kind,
    name: &str,
    parent: Option<&str>,
) -> String {
    let created = flat
        .create(kind, fixtures::payload(kind, name, parent))
        .await
        .unwrap();
    created["id"].as_str().unwrap().to_string()
}

/// A chain `tenant > site > building > room > rack` of single entities.
pub(crate) struct Chain {
    pub tenant: String,
    pub site: String,
    pub building: String,
    pub room: String,
    pub rack: String,
}

pub(crate) async fn chain(flat: &HierarchyService<InMemoryStore>) -> Chain {
    let tenant = create(flat, Kind::Tenant, "acme", None).await;
    let site = create(flat, Kind::Site, "west", Some(&tenant)).await;
    let building = create(flat, Kind::Building, "b1", Some(&site)).await;
    let room = create(flat, Kind::Room, "r1", Some(&building)).await;
    let rack = create(flat, Kind::Rack, "rk1", Some(&room)).await;
    Chain {
        tenant,
        site,
        building,
        room,
        rack,
    }
}
