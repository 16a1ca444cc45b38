//! Nested hierarchy store: auxiliary kinds embedded as an array field
//! (`"<kind>s"`) inside their parent document.
//!
//! Every mutation reads the parent, edits the array in memory and writes it
//! back whole. Two concurrent mutations against the same parent race and the
//! later write wins.

use infratree_domain::document::{
    Document, ID, NAME, PARENT_ID, id_of, nested_elements, normalize, str_field, strip_ids,
};
use infratree_domain::error::{DuplicateError, InfraTreeError, NotFoundError, ValidationError};
use infratree_domain::filter::Filter;
use infratree_domain::id::{ObjectId, generate};
use infratree_domain::kind::{Kind, Placement};
use infratree_domain::validation::ValidationPolicy;
use serde_json::Value;

use crate::ports::DocumentStore;
use crate::services::ValidationService;

/// Application service for the nested store.
#[derive(Clone)]
pub struct NestedEntityService<S> {
    store: S,
    validator: ValidationService<S>,
}

impl<S: Clone> NestedEntityService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S, policy: ValidationPolicy) -> Self {
        Self {
            validator: ValidationService::new(store.clone(), policy),
            store,
        }
    }
}

impl<S: DocumentStore + Sync> NestedEntityService<S> {
    /// Validate `document` and append it to the parent's array.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::Validation`] if the payload is rejected,
    /// [`InfraTreeError::Duplicate`] if a sibling already has the same
    /// `name`, or [`InfraTreeError::NotFound`] if the parent vanished.
    #[tracing::instrument(skip(self, document))]
    pub async fn create_nested(
        &self,
        kind: Kind,
        parent_id: ObjectId,
        document: Document,
    ) -> Result<Document, InfraTreeError> {
        let mut document = strip_ids(document);
        document.insert(PARENT_ID.to_string(), Value::String(parent_id.to_hex()));
        let payload = self
            .validator
            .validate(kind, Placement::Nested, &document)
            .await?;

        let parent_kind = kind.parent()?;
        let parent = self.parent(kind, parent_id).await?;
        let field = kind.nested_field();
        let mut elements = nested_elements(&parent, &field);
        if elements
            .iter()
            .any(|element| str_field(element, NAME) == Some(payload.label()))
        {
            return Err(DuplicateError {
                kind,
                name: payload.label().to_string(),
                parent_id: parent_id.to_hex(),
            }
            .into());
        }

        let id = generate();
        document.insert(ID.to_string(), Value::String(id.clone()));
        elements.push(document.clone());
        self.write_array(parent_kind, parent_id, field, elements)
            .await?;
        tracing::debug!(%id, "nested element created");
        Ok(document)
    }

    /// Find one element by its `id`.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] if the parent or the element is
    /// missing.
    #[tracing::instrument(skip(self))]
    pub async fn get_nested(
        &self,
        kind: Kind,
        parent_id: ObjectId,
        nested_id: &str,
    ) -> Result<Document, InfraTreeError> {
        let parent = self.parent(kind, parent_id).await?;
        nested_elements(&parent, &kind.nested_field())
            .into_iter()
            .find(|element| id_of(element) == Some(nested_id))
            .ok_or_else(|| element_not_found(kind, nested_id))
    }

    /// Every element of the parent's array, verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] if the parent is missing.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_nested(
        &self,
        kind: Kind,
        parent_id: ObjectId,
    ) -> Result<Vec<Document>, InfraTreeError> {
        let parent = self.parent(kind, parent_id).await?;
        Ok(nested_elements(&parent, &kind.nested_field()))
    }

    /// Overwrite the keys of an element that `partial` names. Keys the
    /// element does not already carry are dropped, as are identifier keys.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] if the parent or the element is
    /// missing.
    #[tracing::instrument(skip(self, partial))]
    pub async fn update_nested(
        &self,
        kind: Kind,
        parent_id: ObjectId,
        nested_id: &str,
        partial: Document,
    ) -> Result<Document, InfraTreeError> {
        let parent_kind = kind.parent()?;
        let parent = self.parent(kind, parent_id).await?;
        let field = kind.nested_field();
        let mut elements = nested_elements(&parent, &field);
        let element = elements
            .iter_mut()
            .find(|element| id_of(element) == Some(nested_id))
            .ok_or_else(|| element_not_found(kind, nested_id))?;

        for (key, value) in strip_ids(partial) {
            if let Some(slot) = element.get_mut(&key) {
                *slot = value;
            } else {
                tracing::debug!(%key, "dropping key absent from element");
            }
        }
        let updated = element.clone();
        self.write_array(parent_kind, parent_id, field, elements)
            .await?;
        Ok(updated)
    }

    /// Remove an element from the parent's array.
    ///
    /// # Errors
    ///
    /// Returns [`InfraTreeError::NotFound`] if the parent or the element is
    /// missing.
    #[tracing::instrument(skip(self))]
    pub async fn delete_nested(
        &self,
        kind: Kind,
        parent_id: ObjectId,
        nested_id: &str,
    ) -> Result<(), InfraTreeError> {
        let parent_kind = kind.parent()?;
        let parent = self.parent(kind, parent_id).await?;
        let field = kind.nested_field();
        let mut elements = nested_elements(&parent, &field);
        let before = elements.len();
        elements.retain(|element| id_of(element) != Some(nested_id));
        if elements.len() == before {
            return Err(element_not_found(kind, nested_id));
        }
        self.write_array(parent_kind, parent_id, field, elements)
            .await
    }

    /// Elements of `kind` matching `filter` across every `parent_kind`
    /// document. Filtering happens in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnrelatedParent`] when `kind` does not
    /// nest inside `parent_kind`.
    #[tracing::instrument(skip(self, filter))]
    pub async fn query_nested(
        &self,
        parent_kind: Kind,
        kind: Kind,
        filter: &Filter,
    ) -> Result<Vec<Document>, InfraTreeError> {
        nested(kind)?;
        if !kind.parent_rule().admits(parent_kind) {
            return Err(ValidationError::UnrelatedParent {
                kind,
                parent: parent_kind,
            }
            .into());
        }
        let field = kind.nested_field();
        let parents = self
            .store
            .find_many(parent_kind.name(), &Filter::all())
            .await?;
        Ok(parents
            .iter()
            .flat_map(|parent| nested_elements(parent, &field))
            .filter(|element| filter.matches(element))
            .collect())
    }

    async fn parent(&self, kind: Kind, parent_id: ObjectId) -> Result<Document, InfraTreeError> {
        nested(kind)?;
        let parent_kind = kind.parent()?;
        self.store
            .find_one(parent_kind.name(), &Filter::by_id(parent_id))
            .await?
            .map(normalize)
            .ok_or_else(|| {
                NotFoundError {
                    entity: parent_kind.name(),
                    key: parent_id.to_hex(),
                }
                .into()
            })
    }

    async fn write_array(
        &self,
        parent_kind: Kind,
        parent_id: ObjectId,
        field: String,
        elements: Vec<Document>,
    ) -> Result<(), InfraTreeError> {
        let mut set = Document::new();
        set.insert(
            field,
            Value::Array(elements.into_iter().map(Value::Object).collect()),
        );
        let matched = self
            .store
            .update_one(parent_kind.name(), &Filter::by_id(parent_id), set)
            .await?;
        if matched == 0 {
            return Err(NotFoundError {
                entity: parent_kind.name(),
                key: parent_id.to_hex(),
            }
            .into());
        }
        Ok(())
    }
}

fn nested(kind: Kind) -> Result<(), ValidationError> {
    match kind.placement() {
        Placement::Nested => Ok(()),
        Placement::Flat => Err(ValidationError::WrongPlacement {
            kind,
            actual: Placement::Flat,
            requested: Placement::Nested,
        }),
    }
}

fn element_not_found(kind: Kind, nested_id: &str) -> InfraTreeError {
    NotFoundError {
        entity: kind.name(),
        key: nested_id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use infratree_domain::error::{DUPLICATE, ErrorKind};
    use infratree_domain::fixtures::payload;
    use serde_json::json;

    use super::*;
    use crate::testing::{InMemoryStore, chain, json_doc, services};

    fn oid(hex: &str) -> ObjectId {
        hex.parse().unwrap()
    }

    async fn tile(
        nested: &NestedEntityService<InMemoryStore>,
        room: &str,
        name: &str,
    ) -> Document {
        nested
            .create_nested(Kind::Tile, oid(room), payload(Kind::Tile, name, None))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn should_append_element_with_generated_id() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;

        let created = tile(&nested, &ids.room, "A1").await;

        assert!(created["id"].as_str().unwrap().parse::<ObjectId>().is_ok());
        assert_eq!(created["parentId"], ids.room.as_str());
        let room = flat.get_by_id(Kind::Room, oid(&ids.room)).await.unwrap();
        assert_eq!(room["tiles"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_duplicate_name_and_leave_array_untouched() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;
        let original = tile(&nested, &ids.room, "A1").await;

        let err = nested
            .create_nested(
                Kind::Tile,
                oid(&ids.room),
                payload(Kind::Tile, "A1", None),
            )
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), DUPLICATE);
        let tiles = nested
            .get_all_nested(Kind::Tile, oid(&ids.room))
            .await
            .unwrap();
        assert_eq!(tiles, vec![original]);
    }

    #[tokio::test]
    async fn should_allow_same_name_under_different_parents() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;
        let other = crate::testing::create(&flat, Kind::Room, "r2", Some(&ids.building)).await;

        tile(&nested, &ids.room, "A1").await;
        tile(&nested, &other, "A1").await;
    }

    #[tokio::test]
    async fn should_fail_validation_when_parent_is_missing() {
        let (_, _, nested) = services();

        let err = nested
            .create_nested(
                Kind::RackSensor,
                ObjectId::new(),
                payload(Kind::RackSensor, "probe", None),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn should_refuse_flat_kind_in_nested_store() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;

        let err = nested
            .create_nested(Kind::Device, oid(&ids.rack), payload(Kind::Device, "d", None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InfraTreeError::Validation(ValidationError::WrongPlacement { .. })
        ));
    }

    #[tokio::test]
    async fn should_get_element_by_id() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;
        tile(&nested, &ids.room, "A1").await;
        let second = tile(&nested, &ids.room, "A2").await;
        let second_id = second["id"].as_str().unwrap();

        let found = nested
            .get_nested(Kind::Tile, oid(&ids.room), second_id)
            .await
            .unwrap();

        assert_eq!(found, second);
    }

    #[tokio::test]
    async fn should_drop_keys_absent_from_element_when_updating() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;
        let created = tile(&nested, &ids.room, "A1").await;
        let id = created["id"].as_str().unwrap();

        let updated = nested
            .update_nested(
                Kind::Tile,
                oid(&ids.room),
                id,
                json_doc(json!({"name": "B1", "color": "red", "id": "forged"})),
            )
            .await
            .unwrap();

        assert_eq!(updated["name"], "B1");
        assert!(!updated.contains_key("color"));
        assert_eq!(updated["id"], id);
        let stored = nested
            .get_nested(Kind::Tile, oid(&ids.room), id)
            .await
            .unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn should_remove_only_target_when_deleting() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;
        let first = tile(&nested, &ids.room, "A1").await;
        let second = tile(&nested, &ids.room, "A2").await;

        nested
            .delete_nested(Kind::Tile, oid(&ids.room), first["id"].as_str().unwrap())
            .await
            .unwrap();

        let tiles = nested
            .get_all_nested(Kind::Tile, oid(&ids.room))
            .await
            .unwrap();
        assert_eq!(tiles, vec![second]);
    }

    #[tokio::test]
    async fn should_fail_delete_when_element_is_absent() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;

        let err = nested
            .delete_nested(Kind::Tile, oid(&ids.room), "nope")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn should_query_elements_across_every_parent() {
        let (_, flat, nested) = services();
        let ids = chain(&flat).await;
        let other = crate::testing::create(&flat, Kind::Room, "r2", Some(&ids.building)).await;
        tile(&nested, &ids.room, "A1").await;
        tile(&nested, &other, "A1").await;
        tile(&nested, &other, "A2").await;

        let matching = nested
            .query_nested(Kind::Room, Kind::Tile, &Filter::by_name("A1"))
            .await
            .unwrap();

        assert_eq!(matching.len(), 2);
    }

    #[tokio::test]
    async fn should_reject_query_through_unrelated_parent() {
        let (_, _, nested) = services();

        let err = nested
            .query_nested(Kind::Rack, Kind::Tile, &Filter::all())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InfraTreeError::Validation(ValidationError::UnrelatedParent { .. })
        ));
    }

    #[tokio::test]
    async fn should_vanish_with_parent_on_cascade() {
        let (store, flat, nested) = services();
        let ids = chain(&flat).await;
        nested
            .create_nested(
                Kind::RackSensor,
                oid(&ids.rack),
                payload(Kind::RackSensor, "probe", None),
            )
            .await
            .unwrap();

        flat.delete_cascade(Kind::Rack, oid(&ids.rack))
            .await
            .unwrap();

        assert_eq!(store.count("rack"), 0);
        let err = nested
            .get_all_nested(Kind::RackSensor, oid(&ids.rack))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
