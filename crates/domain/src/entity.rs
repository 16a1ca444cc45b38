//! Typed entity payloads: the pure half of the Validation Engine.
//!
//! Stored documents stay schemaless, but before anything is written the
//! payload is parsed into an [`EntityPayload`]: a common [`Envelope`] plus a
//! per-kind [`KindAttributes`] variant, or one of the two template schemas.
//! Parsing is exhaustive over [`Kind`]; a payload that parses is valid apart
//! from the parent-existence check, which needs the store.

pub mod attributes;
pub mod orientation;
pub mod template;

use serde_json::Value;

pub use attributes::{
    DeviceAttributes, Footprint, KindAttributes, RackAttributes, RoomAttributes, SiteAttributes,
    TenantAttributes,
};
pub use orientation::{DeviceOrientation, RackOrientation, RoomOrientation, SiteOrientation};
pub use template::{ObjectTemplate, RoomTemplate};

use crate::document::{Document, NAME, PARENT_ID};
use crate::error::ValidationError;
use crate::id::ObjectId;
use crate::kind::{Kind, ParentRule};
use crate::validation::{Fields, ValidationPolicy};

const ATTRIBUTES: &str = "attributes";

/// Fields shared by every standard (non-template) kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub name: String,
    pub category: String,
    /// `None` when the policy forbids the field for this kind.
    pub domain: Option<String>,
    /// `None` only for the root kind.
    pub parent_id: Option<ObjectId>,
}

/// A validated payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityPayload {
    Standard {
        envelope: Envelope,
        /// `None` when the kind does not require attributes and none were sent.
        attributes: Option<KindAttributes>,
    },
    RoomTemplate(RoomTemplate),
    ObjectTemplate(ObjectTemplate),
}

impl EntityPayload {
    /// Parse and structurally validate `doc` as a payload of `kind`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered, checking the
    /// envelope before the attributes.
    pub fn parse(
        kind: Kind,
        doc: &Document,
        policy: &ValidationPolicy,
    ) -> Result<Self, ValidationError> {
        match kind {
            Kind::RoomTemplate => RoomTemplate::parse(doc).map(Self::RoomTemplate),
            Kind::ObjectTemplate => ObjectTemplate::parse(doc).map(Self::ObjectTemplate),
            _ => {
                let envelope = Envelope::parse(kind, doc, policy)?;
                let attributes = match doc.get(ATTRIBUTES) {
                    Some(Value::Object(map)) => Some(KindAttributes::parse(kind, map, policy)?),
                    None | Some(Value::Null) if !policy.requires_attributes(kind) => None,
                    _ => return Err(ValidationError::MissingAttributes),
                };
                Ok(Self::Standard {
                    envelope,
                    attributes,
                })
            }
        }
    }

    /// Parent reference, if the kind has one.
    #[must_use]
    pub fn parent_id(&self) -> Option<ObjectId> {
        match self {
            Self::Standard { envelope, .. } => envelope.parent_id,
            Self::RoomTemplate(_) | Self::ObjectTemplate(_) => None,
        }
    }

    /// Display name: `name` for standard kinds, `slug` for templates.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Standard { envelope, .. } => &envelope.name,
            Self::RoomTemplate(t) => &t.slug,
            Self::ObjectTemplate(t) => &t.slug,
        }
    }
}

impl Envelope {
    fn parse(
        kind: Kind,
        doc: &Document,
        policy: &ValidationPolicy,
    ) -> Result<Self, ValidationError> {
        let fields = Fields::envelope(doc);
        let name = fields.required_str(NAME)?.to_string();
        let category = fields.required_str("category")?.to_string();

        let domain = if policy.forbids_domain(kind) {
            match doc.get("domain") {
                None | Some(Value::Null) => None,
                Some(_) => return Err(ValidationError::DomainMustBeAbsent { kind }),
            }
        } else {
            Some(fields.required_str("domain")?.to_string())
        };

        let parent_id = match kind.parent_rule() {
            ParentRule::Root | ParentRule::Template => None,
            ParentRule::Single(_) | ParentRule::Either(..) => Some(parse_parent_id(doc)?),
        };

        Ok(Self {
            name,
            category,
            domain,
            parent_id,
        })
    }
}

fn parse_parent_id(doc: &Document) -> Result<ObjectId, ValidationError> {
    match doc.get(PARENT_ID) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { field: PARENT_ID }),
        Some(Value::String(hex)) => hex
            .parse()
            .map_err(|_| ValidationError::InvalidParentId(hex.clone())),
        Some(other) => Err(ValidationError::InvalidParentId(other.to_string())),
    }
}
