//! Validation policy and field readers used by the per-kind payload parsers.
//!
//! Two historical schema lineages disagree on the `domain` envelope field and
//! on which kinds must carry `attributes`. Both choices are expressed as a
//! [`ValidationPolicy`]; the default is the strict document lineage.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::error::ValidationError;
use crate::kind::Kind;

/// Treatment of the `domain` envelope field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainRule {
    /// Every standard kind needs a non-empty `domain`.
    #[default]
    Required,
    /// Facility-level kinds (site, building, room) must not carry `domain`.
    Absent,
}

/// Schema applied to `attributes` of subdevices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubdeviceRule {
    /// Any attribute document is accepted.
    #[default]
    Unconstrained,
    /// Subdevices follow the device attribute schema.
    Device,
}

/// Configurable knobs of the Validation Engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub domain: DomainRule,
    /// Kinds whose payload must contain an `attributes` document.
    pub attributes_required: BTreeSet<Kind>,
    pub subdevice_attributes: SubdeviceRule,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            domain: DomainRule::default(),
            attributes_required: Kind::ALL
                .into_iter()
                .filter(|kind| *kind <= Kind::Wall)
                .collect(),
            subdevice_attributes: SubdeviceRule::default(),
        }
    }
}

impl ValidationPolicy {
    #[must_use]
    pub fn requires_attributes(&self, kind: Kind) -> bool {
        self.attributes_required.contains(&kind)
    }

    /// Whether `kind` must omit the `domain` field.
    #[must_use]
    pub fn forbids_domain(&self, kind: Kind) -> bool {
        self.domain == DomainRule::Absent && is_facility_level(kind)
    }
}

/// Site, building and room describe the facility itself rather than its
/// equipment.
#[must_use]
pub fn is_facility_level(kind: Kind) -> bool {
    matches!(kind, Kind::Site | Kind::Building | Kind::Room)
}

/// Reads required keys out of a document, producing the right
/// [`ValidationError`] for the envelope or for a kind's `attributes`.
pub(crate) struct Fields<'a> {
    doc: &'a Document,
    owner: Option<Kind>,
}

impl<'a> Fields<'a> {
    /// Reader for top-level envelope fields.
    pub(crate) fn envelope(doc: &'a Document) -> Self {
        Self { doc, owner: None }
    }

    /// Reader for the `attributes` sub-document of `kind`.
    pub(crate) fn attributes(doc: &'a Document, kind: Kind) -> Self {
        Self {
            doc,
            owner: Some(kind),
        }
    }

    fn missing(&self, field: &'static str) -> ValidationError {
        match self.owner {
            Some(kind) => ValidationError::MissingAttribute { kind, field },
            None => ValidationError::MissingField { field },
        }
    }

    /// Key must exist; any value, `null` included, is accepted.
    pub(crate) fn present(&self, field: &'static str) -> Result<&'a Value, ValidationError> {
        self.doc.get(field).ok_or_else(|| self.missing(field))
    }

    /// Key must exist and be neither `null` nor the empty string.
    pub(crate) fn required(&self, field: &'static str) -> Result<&'a Value, ValidationError> {
        match self.doc.get(field) {
            None | Some(Value::Null) => Err(self.missing(field)),
            Some(Value::String(s)) if s.is_empty() => Err(self.missing(field)),
            Some(value) => Ok(value),
        }
    }

    /// Key must hold a non-empty string.
    pub(crate) fn required_str(&self, field: &'static str) -> Result<&'a str, ValidationError> {
        self.required(field)?
            .as_str()
            .ok_or(ValidationError::InvalidType {
                field,
                expected: "string",
            })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::from_value;

    #[test]
    fn should_require_attributes_from_tenant_through_wall_by_default() {
        let policy = ValidationPolicy::default();
        assert!(policy.requires_attributes(Kind::Tenant));
        assert!(policy.requires_attributes(Kind::Subdevice1));
        assert!(policy.requires_attributes(Kind::Wall));
        assert!(!policy.requires_attributes(Kind::Cabinet));
        assert!(!policy.requires_attributes(Kind::DeviceSensor));
        assert!(!policy.requires_attributes(Kind::RoomTemplate));
    }

    #[test]
    fn should_forbid_domain_only_for_facility_kinds_under_absent_rule() {
        let policy = ValidationPolicy {
            domain: DomainRule::Absent,
            ..ValidationPolicy::default()
        };
        assert!(policy.forbids_domain(Kind::Building));
        assert!(!policy.forbids_domain(Kind::Rack));
        assert!(!ValidationPolicy::default().forbids_domain(Kind::Building));
    }

    #[test]
    fn should_deserialize_policy_from_kind_names() {
        let json = r#"{"domain": "absent", "attributes_required": ["tenant", "rack"]}"#;
        let policy: ValidationPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(policy.domain, DomainRule::Absent);
        assert_eq!(policy.attributes_required.len(), 2);
        assert_eq!(policy.subdevice_attributes, SubdeviceRule::Unconstrained);
    }

    #[test]
    fn should_report_missing_envelope_field() {
        let doc = from_value(json!({"name": ""})).unwrap();
        let fields = Fields::envelope(&doc);
        assert_eq!(
            fields.required_str("name"),
            Err(ValidationError::MissingField { field: "name" })
        );
    }

    #[test]
    fn should_report_missing_attribute_with_kind() {
        let doc = from_value(json!({"color": null})).unwrap();
        let fields = Fields::attributes(&doc, Kind::Tenant);
        assert_eq!(
            fields.required("color"),
            Err(ValidationError::MissingAttribute {
                kind: Kind::Tenant,
                field: "color"
            })
        );
        assert!(fields.present("color").is_ok());
    }

    #[test]
    fn should_reject_non_string_where_string_expected() {
        let doc = from_value(json!({"sizeUnit": 3})).unwrap();
        let fields = Fields::attributes(&doc, Kind::Rack);
        assert_eq!(
            fields.required_str("sizeUnit"),
            Err(ValidationError::InvalidType {
                field: "sizeUnit",
                expected: "string"
            })
        );
    }
}
