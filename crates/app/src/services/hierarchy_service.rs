//! Flat hierarchy store: entities in top-level collections linked to their
//! parent by `parentId`.

use std::collections::BTreeMap;

use infratree_domain::document::{Document, NAME, PARENT_ID, id_of, normalize, strip_ids};
use infratree_domain::error::{InfraTreeError, NotFoundError, ValidationError};
use infratree_domain::filter::Filter;
use infratree_domain::hierarchy::{DeletionPlan, PlanStep, TreeNode};
use infratree_domain::id::ObjectId;
use infratree_domain::kind::{Kind, Placement};
use infratree_domain::validation::ValidationPolicy;
use serde_json::Value;

use crate::collector::{Descent, SubtreeCollector};
use crate::ports::DocumentStore;
use crate::services::{RootLookup, ValidationService};

/// Application service for the flat store.
#[derive(Clone)]
pub struct HierarchyService<S> {
    store: S,
    validator: ValidationService<S>,
}

impl<S: Clone> HierarchyService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S, policy: ValidationPolicy) -> Self {
        Self {
            validator: ValidationService::new(store.clone(), policy),
            store,
        }
    }
}

impl<S: DocumentStore + Sync> HierarchyService<S> {
    /// Validate and insert a new entity.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::Validation`] if the payload is rejected, or
    /// a storage error from the store.
    #[tracing::instrument(skip(self, document))]
    pub async fn create(
        &self,
        kind: Kind,
        document: Document,
    ) -> Result<Document, InfraTreeError> {
        let collection = flat(kind)?;
        let mut document = strip_ids(document);
        let payload = self
            .validator
            .validate(kind, Placement::Flat, &document)
            .await?;
        // Children are looked up by the lowercase form.
        if let Some(parent_id) = payload.parent_id() {
            document.insert(PARENT_ID.to_string(), Value::String(parent_id.to_hex()));
        }
        let id = self.store.insert_one(collection, document).await?;
        tracing::debug!(%id, "created");
        self.get_by_id(kind, id).await
    }

    /// Look up an entity by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when no entity of `kind` has `id`.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, kind: Kind, id: ObjectId) -> Result<Document, InfraTreeError> {
        self.find_one(kind, &Filter::by_id(id), id.to_hex()).await
    }

    /// Look up an entity by name. Names are only unique for the root and
    /// template kinds; otherwise the first match wins.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when nothing matches.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_name(&self, kind: Kind, name: &str) -> Result<Document, InfraTreeError> {
        self.find_one(kind, &Filter::by_name(name), name.to_string()).await
    }

    /// Look up a template by slug.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when nothing matches.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_slug(&self, kind: Kind, slug: &str) -> Result<Document, InfraTreeError> {
        self.find_one(kind, &Filter::by_slug(slug), slug.to_string()).await
    }

    /// Look up the first entity of a path: a tenant by name, any other kind
    /// by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when nothing matches, or
    /// [`InfraTreeError::Validation`] when a non-tenant key is not an
    /// identifier.
    #[tracing::instrument(skip(self))]
    pub async fn get_root(&self, root: &RootLookup) -> Result<Document, InfraTreeError> {
        match root.kind {
            Kind::Tenant => self.get_by_name(Kind::Tenant, &root.key).await,
            kind => self.get_by_id(kind, root.key.parse()?).await,
        }
    }

    /// Look up the child of `kind` named `name` under `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when nothing matches.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_name_and_parent(
        &self,
        kind: Kind,
        parent_id: &str,
        name: &str,
    ) -> Result<Document, InfraTreeError> {
        let filter = Filter::by_parent(parent_id).eq(NAME, name);
        self.find_one(kind, &filter, format!("{name} under {parent_id}")).await
    }

    /// List every entity of `kind`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self, kind: Kind) -> Result<Vec<Document>, InfraTreeError> {
        self.find_many(kind, &Filter::all()).await
    }

    /// List entities of `kind` matching every key of `query`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_by_query(
        &self,
        kind: Kind,
        query: Document,
    ) -> Result<Vec<Document>, InfraTreeError> {
        self.find_many(kind, &Filter::from_document(query)).await
    }

    /// List entities of `child_kind` whose `parentId` is `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn get_children(
        &self,
        child_kind: Kind,
        parent_id: &str,
    ) -> Result<Vec<Document>, InfraTreeError> {
        self.find_many(child_kind, &Filter::by_parent(parent_id)).await
    }

    /// List every `kind + 2` entity under the `kind + 1` children of the
    /// root entity.
    ///
    /// # Errors
    ///
    /// As [`get_root`](Self::get_root) when the root cannot be found.
    #[tracing::instrument(skip(self))]
    pub async fn get_grandchildren(
        &self,
        root: &RootLookup,
    ) -> Result<Vec<Document>, InfraTreeError> {
        let kind = root.kind;
        let root = self.get_root(root).await?;
        let Some(root_id) = id_of(&root) else {
            return Ok(Vec::new());
        };
        let Some(child_kind) = kind.next_level() else {
            return Ok(Vec::new());
        };
        let Some(grandchild_kind) = child_kind.next_level() else {
            return Ok(Vec::new());
        };
        let mut grandchildren = Vec::new();
        for child in self.get_children(child_kind, root_id).await? {
            if let Some(child_id) = id_of(&child) {
                grandchildren.extend(self.get_children(grandchild_kind, child_id).await?);
            }
        }
        Ok(grandchildren)
    }

    /// Assemble the tree below an entity, stopping at `end_kind`.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when the root is missing.
    #[tracing::instrument(skip(self))]
    pub async fn get_hierarchy(
        &self,
        kind: Kind,
        id: ObjectId,
        end_kind: Kind,
    ) -> Result<TreeNode, InfraTreeError> {
        let root = self.get_by_id(kind, id).await?;
        self.collect(kind, root, Descent::Chain { end: end_kind })
            .await
    }

    /// [`get_hierarchy`](Self::get_hierarchy) rooted at the tenant named
    /// `name`.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when no tenant has that name.
    #[tracing::instrument(skip(self))]
    pub async fn get_tenant_hierarchy(
        &self,
        name: &str,
        end_kind: Kind,
    ) -> Result<TreeNode, InfraTreeError> {
        let root = self.get_by_name(Kind::Tenant, name).await?;
        self.collect(Kind::Tenant, root, Descent::Chain { end: end_kind })
            .await
    }

    /// Every level below an entity, keyed `"<kind>s"`.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when the root is missing.
    pub async fn get_hierarchy_flattened(
        &self,
        kind: Kind,
        id: ObjectId,
        end_kind: Kind,
    ) -> Result<BTreeMap<String, Vec<Document>>, InfraTreeError> {
        Ok(self.get_hierarchy(kind, id, end_kind).await?.flatten())
    }

    /// Merge `partial` into the stored entity without revalidating it.
    /// Identifier keys in `partial` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when no entity matched.
    #[tracing::instrument(skip(self, partial))]
    pub async fn update(
        &self,
        kind: Kind,
        id: ObjectId,
        partial: Document,
    ) -> Result<Document, InfraTreeError> {
        let matched = self
            .store
            .update_one(flat(kind)?, &Filter::by_id(id), strip_ids(partial))
            .await?;
        if matched == 0 {
            return Err(not_found(kind, id.to_hex()));
        }
        self.get_by_id(kind, id).await
    }

    /// Merge `partial` into the template with the given slug. The slug
    /// itself may be changed by the merge.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when no template matched.
    #[tracing::instrument(skip(self, partial))]
    pub async fn update_by_slug(
        &self,
        kind: Kind,
        slug: &str,
        partial: Document,
    ) -> Result<Document, InfraTreeError> {
        let current = self.get_by_slug(kind, slug).await?;
        self.update(kind, stored_id(&current)?, partial).await
    }

    /// Delete the template with the given slug.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when no template matched.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_slug(&self, kind: Kind, slug: &str) -> Result<(), InfraTreeError> {
        let deleted = self
            .store
            .delete_one(flat(kind)?, &Filter::by_slug(slug))
            .await?;
        if deleted == 0 {
            return Err(not_found(kind, slug.to_string()));
        }
        Ok(())
    }

    /// Collect every identifier a cascade delete of the entity would remove,
    /// children first and the entity itself last.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when the entity is missing.
    #[tracing::instrument(skip(self))]
    pub async fn plan_cascade(
        &self,
        kind: Kind,
        id: ObjectId,
    ) -> Result<DeletionPlan, InfraTreeError> {
        let root = self.get_by_id(kind, id).await?;
        let tree = self.collect(kind, root, Descent::Cascade).await?;
        let plan = DeletionPlan::from_pre_order(pre_order(&tree)?);
        tracing::debug!(steps = plan.len(), "cascade planned");
        Ok(plan)
    }

    /// Delete an entity and all its descendants, children before parents.
    ///
    /// Nothing is rolled back: a failure part way leaves the steps already
    /// applied in effect and the rest, root included, in place.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] when the entity is missing or a
    /// planned document vanished before its turn, or a storage error from
    /// the first failed delete.
    #[tracing::instrument(skip(self))]
    pub async fn delete_cascade(
        &self,
        kind: Kind,
        id: ObjectId,
    ) -> Result<DeletionPlan, InfraTreeError> {
        let plan = self.plan_cascade(kind, id).await?;
        self.apply(&plan).await?;
        Ok(plan)
    }

    /// Apply a deletion plan step by step, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Same as [`delete_cascade`](Self::delete_cascade).
    pub async fn apply(&self, plan: &DeletionPlan) -> Result<(), InfraTreeError> {
        for (applied, step) in plan.steps().iter().enumerate() {
            let outcome = self
                .store
                .delete_one(step.kind.name(), &Filter::by_id(step.id))
                .await
                .and_then(|deleted| {
                    if deleted == 0 {
                        Err(not_found(step.kind, step.id.to_hex()))
                    } else {
                        Ok(())
                    }
                });
            if let Err(err) = outcome {
                tracing::warn!(
                    applied,
                    kind = %step.kind,
                    id = %step.id,
                    error = %err.detail(),
                    "cascade stopped"
                );
                return Err(err);
            }
            tracing::debug!(kind = %step.kind, id = %step.id, "deleted");
        }
        Ok(())
    }

    async fn find_one(
        &self,
        kind: Kind,
        filter: &Filter,
        key: String,
    ) -> Result<Document, InfraTreeError> {
        self.store
            .find_one(flat(kind)?, filter)
            .await?
            .map(normalize)
            .ok_or_else(|| not_found(kind, key))
    }

    async fn find_many(
        &self,
        kind: Kind,
        filter: &Filter,
    ) -> Result<Vec<Document>, InfraTreeError> {
        let found = self.store.find_many(flat(kind)?, filter).await?;
        Ok(found.into_iter().map(normalize).collect())
    }

    async fn collect(
        &self,
        kind: Kind,
        root: Document,
        descent: Descent,
    ) -> Result<TreeNode, InfraTreeError> {
        SubtreeCollector::new(&self.store)
            .collect(kind, root, descent)
            .await
    }
}

/// Collection name of a flat kind.
fn flat(kind: Kind) -> Result<&'static str, ValidationError> {
    match kind.placement() {
        Placement::Flat => Ok(kind.name()),
        Placement::Nested => Err(ValidationError::WrongPlacement {
            kind,
            actual: Placement::Nested,
            requested: Placement::Flat,
        }),
    }
}

fn not_found(kind: Kind, key: String) -> InfraTreeError {
    NotFoundError {
        entity: kind.name(),
        key,
    }
    .into()
}

/// Identifier of a document read back from the store. Stores always write
/// well-formed identifiers, so a bad one is a storage fault.
fn stored_id(document: &Document) -> Result<ObjectId, InfraTreeError> {
    id_of(document)
        .unwrap_or_default()
        .parse()
        .map_err(|err| InfraTreeError::Storage(Box::new(err)))
}

fn pre_order(tree: &TreeNode) -> Result<Vec<PlanStep>, InfraTreeError> {
    let mut steps = Vec::with_capacity(tree.node_count());
    let mut stack = vec![tree];
    while let Some(node) = stack.pop() {
        steps.push(PlanStep {
            kind: node.kind,
            id: stored_id(&node.document)?,
        });
        stack.extend(node.children().iter().rev());
    }
    Ok(steps)
}
