//! Minimal valid payloads for every kind.
//!
//! Compiled for this crate's tests and, behind the `fixtures` feature, for
//! the tests of downstream crates.

use serde_json::{Value, json};

use crate::document::{Document, from_value};
use crate::kind::Kind;

#[must_use]
pub fn attributes(kind: Kind) -> Value {
    match kind {
        Kind::Tenant => json!({"color": "ffffff"}),
        Kind::Site => json!({
            "orientation": "NW",
            "usableColor": "5BDCFF",
            "reservedColor": "AAAAAA",
            "technicalColor": "D0FF78"
        }),
        Kind::Building => json!({
            "posXY": {"x": 0.0, "y": 0.0}, "posXYUnit": "m",
            "size": {"x": 10.0, "y": 20.0}, "sizeUnit": "m",
            "height": 5, "heightUnit": "m"
        }),
        Kind::Room => json!({
            "posXY": {"x": 0.0, "y": 0.0}, "posXYUnit": "m",
            "size": {"x": 10.0, "y": 20.0}, "sizeUnit": "m",
            "height": 3, "heightUnit": "m",
            "orientation": "+E+N"
        }),
        Kind::Rack => json!({
            "posXY": {"x": 1.0, "y": 2.0}, "posXYUnit": "tile",
            "size": {"x": 60.0, "y": 120.0}, "sizeUnit": "cm",
            "height": 42, "heightUnit": "U",
            "orientation": "front"
        }),
        Kind::Device => json!({
            "orientation": "front",
            "size": {"x": 48.0, "y": 60.0}, "sizeUnit": "cm",
            "height": 2, "heightUnit": "U"
        }),
        _ => json!({}),
    }
}

/// Valid payload of `kind` whose parent reference (if any) is `parent`.
#[must_use]
pub fn payload(kind: Kind, name: &str, parent: Option<&str>) -> Document {
    let doc = match kind {
        Kind::RoomTemplate => json!({
            "slug": name, "colors": [],
            "orientation": "+N+E", "sizeWDHm": [10, 20, 3],
            "technicalArea": [0, 0, 0, 0], "reservedArea": [0, 0, 0, 0],
            "separators": [], "tiles": []
        }),
        Kind::ObjectTemplate => json!({
            "slug": name, "colors": [], "description": "1U server",
            "category": "device", "sizeWDHmm": [482, 600, 44],
            "fbxModel": "", "attributes": {}, "slots": []
        }),
        _ => json!({
            "name": name,
            "category": kind.name(),
            "domain": "demo",
            "attributes": attributes(kind)
        }),
    };
    let mut doc = from_value(doc).unwrap_or_default();
    if let Some(parent) = parent {
        doc.insert("parentId".to_string(), Value::String(parent.to_string()));
    }
    doc
}
