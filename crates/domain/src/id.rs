//! Document identifiers.
//!
//! An [`ObjectId`] is a fixed-width 128-bit random value. Externally it is
//! always rendered as 32 lowercase hex characters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of hex characters in the external form of an [`ObjectId`].
pub const HEX_LEN: usize = 32;

/// Identifier of a stored document (or of a nested array element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(#[serde(with = "uuid::serde::simple")] uuid::Uuid);

impl Default for ObjectId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl ObjectId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }

    /// Lowercase hex form, as exposed under the `id` key.
    #[must_use]
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

/// The input was not exactly [`HEX_LEN`] hex digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id {0:?}")]
pub struct InvalidObjectId(pub String);

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidObjectId(s.to_string()));
        }
        uuid::Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| InvalidObjectId(s.to_string()))
    }
}

/// Generate a random string identifier for records the store does not
/// identify itself (nested array elements).
#[must_use]
pub fn generate() -> String {
    ObjectId::new().to_hex()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_repeatedly() {
        let ids: HashSet<String> = (0..1_000).map(|_| generate()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn should_render_as_lowercase_hex() {
        let text = ObjectId::new().to_hex();
        assert_eq!(text.len(), HEX_LEN);
        assert!(
            text.bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        );
    }

    #[test]
    fn should_roundtrip_through_display_and_from_str() {
        let id = ObjectId::new();
        let parsed: ObjectId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn should_serialize_as_hex_string() {
        let id = ObjectId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn should_reject_hyphenated_uuid() {
        let hyphenated = ObjectId::new().as_uuid().hyphenated().to_string();
        assert!(hyphenated.parse::<ObjectId>().is_err());
    }

    #[test]
    fn should_reject_non_hex_input() {
        assert!("not-an-id".parse::<ObjectId>().is_err());
        assert!("zz".repeat(16).parse::<ObjectId>().is_err());
    }
}
