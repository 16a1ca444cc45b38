//! Template schemas. Templates are keyed by `slug` and share nothing with
//! the standard envelope.

use serde_json::Value;

use crate::document::{Document, SLUG};
use crate::error::ValidationError;
use crate::validation::Fields;

/// Reusable room layout.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomTemplate {
    pub slug: String,
    pub colors: Value,
    pub orientation: Value,
    pub size_wdhm: Value,
    pub technical_area: Value,
    pub reserved_area: Value,
    pub separators: Value,
    pub tiles: Value,
}

/// Reusable equipment model.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTemplate {
    pub slug: String,
    pub colors: Value,
    pub description: Value,
    pub category: Value,
    pub size_wdhmm: Value,
    pub fbx_model: Value,
    pub attributes: Value,
    pub slots: Value,
}

impl RoomTemplate {
    pub(crate) fn parse(doc: &Document) -> Result<Self, ValidationError> {
        let fields = Fields::envelope(doc);
        Ok(Self {
            slug: fields.required_str(SLUG)?.to_string(),
            colors: fields.present("colors")?.clone(),
            orientation: fields.present("orientation")?.clone(),
            size_wdhm: fields.present("sizeWDHm")?.clone(),
            technical_area: fields.present("technicalArea")?.clone(),
            reserved_area: fields.present("reservedArea")?.clone(),
            separators: fields.present("separators")?.clone(),
            tiles: fields.present("tiles")?.clone(),
        })
    }
}

impl ObjectTemplate {
    pub(crate) fn parse(doc: &Document) -> Result<Self, ValidationError> {
        let fields = Fields::envelope(doc);
        Ok(Self {
            slug: fields.required_str(SLUG)?.to_string(),
            colors: fields.present("colors")?.clone(),
            description: fields.present("description")?.clone(),
            category: fields.present("category")?.clone(),
            size_wdhmm: fields.present("sizeWDHmm")?.clone(),
            fbx_model: fields.present("fbxModel")?.clone(),
            attributes: fields.present("attributes")?.clone(),
            slots: fields.present("slots")?.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::payload;
    use crate::kind::Kind;

    #[test]
    fn should_parse_object_template() {
        let doc = payload(Kind::ObjectTemplate, "server-1u", None);
        let template = ObjectTemplate::parse(&doc).unwrap();
        assert_eq!(template.slug, "server-1u");
    }

    #[test]
    fn should_require_every_room_template_key() {
        for field in [
            "slug",
            "colors",
            "orientation",
            "sizeWDHm",
            "technicalArea",
            "reservedArea",
            "separators",
            "tiles",
        ] {
            let mut doc = payload(Kind::RoomTemplate, "hall", None);
            doc.remove(field);
            assert_eq!(
                RoomTemplate::parse(&doc),
                Err(ValidationError::MissingField { field })
            );
        }
    }

    #[test]
    fn should_require_every_object_template_key() {
        for field in [
            "slug",
            "colors",
            "description",
            "category",
            "sizeWDHmm",
            "fbxModel",
            "attributes",
            "slots",
        ] {
            let mut doc = payload(Kind::ObjectTemplate, "pdu", None);
            doc.remove(field);
            assert_eq!(
                ObjectTemplate::parse(&doc),
                Err(ValidationError::MissingField { field })
            );
        }
    }

    #[test]
    fn should_accept_empty_colour_list() {
        let doc = payload(Kind::RoomTemplate, "hall", None);
        assert!(RoomTemplate::parse(&doc).is_ok());
    }
}
