//! Ancestor path resolver: walks `(kind, name)` steps down from a root.

use infratree_domain::document::{Document, NAME, id_of, nested_elements, str_field};
use infratree_domain::error::{InfraTreeError, NotFoundError, ValidationError};
use infratree_domain::kind::{Kind, Placement};
use infratree_domain::path::PathStep;

use crate::ports::DocumentStore;
use crate::services::HierarchyService;

/// How the first entity of a path is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLookup {
    pub kind: Kind,
    /// Name for tenants, hex identifier for every other kind.
    pub key: String,
}

impl RootLookup {
    #[must_use]
    pub fn tenant(name: impl Into<String>) -> Self {
        Self {
            kind: Kind::Tenant,
            key: name.into(),
        }
    }

    #[must_use]
    pub fn by_id(kind: Kind, id: impl Into<String>) -> Self {
        Self {
            kind,
            key: id.into(),
        }
    }
}

/// Outcome of a walk: a single entity, or the listing a wildcard step
/// asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Entity(Document),
    Listing(Vec<Document>),
}

impl Resolved {
    fn shape(&self) -> &'static str {
        match self {
            Self::Entity(_) => "entity",
            Self::Listing(_) => "listing",
        }
    }
}

/// Resolves ancestor paths on top of the flat store. Steps naming a nested
/// kind are looked up inside the current entity's array field.
#[derive(Clone)]
pub struct AncestorResolver<S> {
    flat: HierarchyService<S>,
}

impl<S: DocumentStore + Sync> AncestorResolver<S> {
    pub fn new(flat: HierarchyService<S>) -> Self {
        Self { flat }
    }

    /// Walk `steps` from `root`. A wildcard step stops the walk and lists
    /// every child of its kind under the last resolved entity; an empty path
    /// resolves to the root itself.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] as soon as the root or any step
    /// cannot be resolved; no partial result is returned.
    #[tracing::instrument(skip(self, steps), fields(steps = steps.len()))]
    pub async fn resolve(
        &self,
        root: &RootLookup,
        steps: &[PathStep],
    ) -> Result<Resolved, InfraTreeError> {
        let mut current = self.flat.get_root(root).await?;

        for step in steps {
            if step.kind.placement() == Placement::Nested {
                let elements = nested_elements(&current, &step.kind.nested_field());
                if step.is_wildcard() {
                    return Ok(Resolved::Listing(elements));
                }
                current = elements
                    .into_iter()
                    .find(|element| str_field(element, NAME) == Some(step.name.as_str()))
                    .ok_or_else(|| unresolved(step))?;
                continue;
            }

            let parent_id = id_of(&current).unwrap_or_default().to_string();
            if step.is_wildcard() {
                let listing = self.flat.get_children(step.kind, &parent_id).await?;
                return Ok(Resolved::Listing(listing));
            }
            current = self
                .flat
                .get_by_name_and_parent(step.kind, &parent_id, &step.name)
                .await
                .map_err(|err| match err {
                    InfraTreeError::NotFound(_) => unresolved(step),
                    other => other,
                })?;
        }
        Ok(Resolved::Entity(current))
    }

    /// [`resolve`](Self::resolve) a path that must end in one entity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnexpectedResolution`] if the path ended in
    /// a listing, otherwise as [`resolve`](Self::resolve).
    pub async fn resolve_entity(
        &self,
        root: &RootLookup,
        steps: &[PathStep],
    ) -> Result<Document, InfraTreeError> {
        match self.resolve(root, steps).await? {
            Resolved::Entity(document) => Ok(document),
            other => Err(unexpected("entity", &other)),
        }
    }

    /// [`resolve`](Self::resolve) a path that must end in a wildcard step.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnexpectedResolution`] if the path ended in
    /// a single entity, otherwise as [`resolve`](Self::resolve).
    pub async fn resolve_listing(
        &self,
        root: &RootLookup,
        steps: &[PathStep],
    ) -> Result<Vec<Document>, InfraTreeError> {
        match self.resolve(root, steps).await? {
            Resolved::Listing(documents) => Ok(documents),
            other => Err(unexpected("listing", &other)),
        }
    }
}

fn unresolved(step: &PathStep) -> InfraTreeError {
    NotFoundError {
        entity: step.kind.name(),
        key: step.name.clone(),
    }
    .into()
}

fn unexpected(expected: &'static str, actual: &Resolved) -> InfraTreeError {
    ValidationError::UnexpectedResolution {
        expected,
        actual: actual.shape(),
    }
    .into()
}
