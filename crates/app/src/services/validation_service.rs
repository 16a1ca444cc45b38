//! Validation service: structural checks plus parent existence.

use infratree_domain::document::Document;
use infratree_domain::entity::EntityPayload;
use infratree_domain::error::{InfraTreeError, ValidationError};
use infratree_domain::filter::Filter;
use infratree_domain::id::ObjectId;
use infratree_domain::kind::{Kind, Placement};
use infratree_domain::validation::ValidationPolicy;

use crate::ports::DocumentStore;

/// Decides whether a payload may be written as a given kind.
#[derive(Clone)]
pub struct ValidationService<S> {
    store: S,
    policy: ValidationPolicy,
}

impl<S> ValidationService<S> {
    /// Create a new validator reading parents from `store`.
    pub fn new(store: S, policy: ValidationPolicy) -> Self {
        Self { store, policy }
    }
}

impl<S: DocumentStore + Sync> ValidationService<S> {
    /// Validate `document` as a new entity of `kind` stored with the given
    /// placement.
    ///
    /// The envelope is checked first, then the attributes, and finally the
    /// parent reference is resolved against every kind the parent rule
    /// admits.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::Validation`] describing the first failed
    /// check, or a storage error from the parent lookup.
    #[tracing::instrument(skip(self, document), fields(kind = %kind))]
    pub async fn validate(
        &self,
        kind: Kind,
        placement: Placement,
        document: &Document,
    ) -> Result<EntityPayload, InfraTreeError> {
        if kind.placement() != placement {
            return Err(ValidationError::WrongPlacement {
                kind,
                actual: kind.placement(),
                requested: placement,
            }
            .into());
        }
        let payload = EntityPayload::parse(kind, document, &self.policy)?;
        if let Some(parent_id) = payload.parent_id() {
            self.parent_kind(kind, parent_id).await?;
        }
        Ok(payload)
    }

    /// Find which admitted parent kind holds `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ParentNotFound`] when no admitted
    /// collection holds the identifier.
    pub async fn parent_kind(
        &self,
        kind: Kind,
        parent_id: ObjectId,
    ) -> Result<Kind, InfraTreeError> {
        let candidates = kind.parent_rule().candidates();
        for candidate in &candidates {
            let found = self
                .store
                .find_one(candidate.name(), &Filter::by_id(parent_id))
                .await?;
            if found.is_some() {
                return Ok(*candidate);
            }
        }
        tracing::debug!(%parent_id, "parent not found");
        Err(ValidationError::ParentNotFound {
            expected: candidates
                .iter()
                .map(|candidate| candidate.name())
                .collect::<Vec<_>>()
                .join(" or "),
            id: parent_id.to_hex(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use infratree_domain::fixtures::payload;
    use serde_json::json;

    use super::*;
    use crate::testing::{InMemoryStore, chain, services};

    fn validator(store: &InMemoryStore) -> ValidationService<InMemoryStore> {
        ValidationService::new(store.clone(), ValidationPolicy::default())
    }

    #[tokio::test]
    async fn should_accept_device_under_existing_rack() {
        let (store, flat, _) = services();
        let ids = chain(&flat).await;
        let doc = payload(Kind::Device, "d1", Some(&ids.rack));

        let result = validator(&store)
            .validate(Kind::Device, Placement::Flat, &doc)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_report_both_candidates_when_device_parent_is_missing() {
        let store = InMemoryStore::default();
        let missing = ObjectId::new();
        let doc = payload(Kind::Device, "d1", Some(&missing.to_hex()));

        let err = validator(&store)
            .validate(Kind::Device, Placement::Flat, &doc)
            .await
            .unwrap_err();

        let InfraTreeError::Validation(ValidationError::ParentNotFound { expected, id }) = err
        else {
            panic!("expected ParentNotFound, got {err:?}");
        };
        assert_eq!(expected, "rack or device");
        assert_eq!(id, missing.to_hex());
    }

    #[tokio::test]
    async fn should_resolve_device_parented_by_device() {
        let (store, flat, _) = services();
        let ids = chain(&flat).await;
        let outer = crate::testing::create(&flat, Kind::Device, "outer", Some(&ids.rack)).await;

        let kind = validator(&store)
            .parent_kind(Kind::Device, outer.parse().unwrap())
            .await
            .unwrap();

        assert_eq!(kind, Kind::Device);
    }

    #[tokio::test]
    async fn should_reject_nested_kind_for_flat_placement() {
        let store = InMemoryStore::default();
        let doc = payload(Kind::Tile, "t1", Some(&ObjectId::new().to_hex()));

        let err = validator(&store)
            .validate(Kind::Tile, Placement::Flat, &doc)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InfraTreeError::Validation(ValidationError::WrongPlacement {
                kind: Kind::Tile,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn should_fail_structural_check_before_touching_store() {
        let store = InMemoryStore::default();
        let mut doc = payload(Kind::Rack, "R1", Some(&ObjectId::new().to_hex()));
        doc.insert("attributes".to_string(), json!("not an object"));

        let err = validator(&store)
            .validate(Kind::Rack, Placement::Flat, &doc)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            infratree_domain::error::VALIDATE,
            "{}",
            err.detail()
        );
        assert!(matches!(
            err,
            InfraTreeError::Validation(ValidationError::MissingAttributes)
        ));
    }
}
