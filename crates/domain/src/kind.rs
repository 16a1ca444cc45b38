//! Kind Registry: the fixed taxonomy of infrastructure entities.
//!
//! Kinds are totally ordered: the facility chain runs Tenant → Site →
//! Building → Room → Rack → Device → Subdevice → Subdevice1, followed by the
//! auxiliary kinds and the two templates. Each kind maps to a collection
//! name, a parent rule and a storage placement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One value of the fixed taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "tenant")]
    Tenant,
    #[serde(rename = "site")]
    Site,
    #[serde(rename = "building")]
    Building,
    #[serde(rename = "room")]
    Room,
    #[serde(rename = "rack")]
    Rack,
    #[serde(rename = "device")]
    Device,
    #[serde(rename = "subdevice")]
    Subdevice,
    #[serde(rename = "subdevice1")]
    Subdevice1,
    #[serde(rename = "ac")]
    Ac,
    #[serde(rename = "panel")]
    PowerPanel,
    #[serde(rename = "separator")]
    Wall,
    #[serde(rename = "cabinet")]
    Cabinet,
    #[serde(rename = "row")]
    Aisle,
    #[serde(rename = "tile")]
    Tile,
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "corridor")]
    Corridor,
    #[serde(rename = "rack_sensor")]
    RackSensor,
    #[serde(rename = "device_sensor")]
    DeviceSensor,
    #[serde(rename = "room_template")]
    RoomTemplate,
    #[serde(rename = "obj_template")]
    ObjectTemplate,
}

/// Which documents may act as the parent of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRule {
    /// Top of the facility chain.
    Root,
    /// Templates live outside the hierarchy.
    Template,
    /// Exactly one parent collection.
    Single(Kind),
    /// The parent may live in either collection (tried in order).
    Either(Kind, Kind),
}

impl ParentRule {
    /// Kinds whose documents are acceptable parents, in lookup order.
    #[must_use]
    pub fn candidates(self) -> Vec<Kind> {
        match self {
            Self::Root | Self::Template => Vec::new(),
            Self::Single(kind) => vec![kind],
            Self::Either(first, second) => vec![first, second],
        }
    }

    /// Whether `kind` may act as the parent.
    #[must_use]
    pub fn admits(self, kind: Kind) -> bool {
        self.candidates().contains(&kind)
    }
}

/// How documents of a kind are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Top-level collection, linked to the parent by `parentId`.
    Flat,
    /// Array field embedded in the parent document.
    Nested,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Nested => f.write_str("nested"),
        }
    }
}

/// Registry lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KindError {
    #[error("unknown kind {0:?}")]
    UnknownKind(String),

    #[error("{0} has no parent kind")]
    NoParent(Kind),
}

impl Kind {
    /// Every kind, in the total order.
    pub const ALL: [Kind; 20] = [
        Kind::Tenant,
        Kind::Site,
        Kind::Building,
        Kind::Room,
        Kind::Rack,
        Kind::Device,
        Kind::Subdevice,
        Kind::Subdevice1,
        Kind::Ac,
        Kind::PowerPanel,
        Kind::Wall,
        Kind::Cabinet,
        Kind::Aisle,
        Kind::Tile,
        Kind::Group,
        Kind::Corridor,
        Kind::RackSensor,
        Kind::DeviceSensor,
        Kind::RoomTemplate,
        Kind::ObjectTemplate,
    ];

    /// The deepest kind of the facility chain.
    pub const DEEPEST: Kind = Kind::Subdevice1;

    /// Collection name (and external spelling) of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Site => "site",
            Self::Building => "building",
            Self::Room => "room",
            Self::Rack => "rack",
            Self::Device => "device",
            Self::Subdevice => "subdevice",
            Self::Subdevice1 => "subdevice1",
            Self::Ac => "ac",
            Self::PowerPanel => "panel",
            Self::Wall => "separator",
            Self::Cabinet => "cabinet",
            Self::Aisle => "row",
            Self::Tile => "tile",
            Self::Group => "group",
            Self::Corridor => "corridor",
            Self::RackSensor => "rack_sensor",
            Self::DeviceSensor => "device_sensor",
            Self::RoomTemplate => "room_template",
            Self::ObjectTemplate => "obj_template",
        }
    }

    /// Look a kind up by its name.
    ///
    /// # Errors
    ///
    /// Returns [`KindError::UnknownKind`] when no kind carries `name`.
    pub fn from_name(name: &str) -> Result<Self, KindError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| KindError::UnknownKind(name.to_string()))
    }

    /// Position of the kind in the total order.
    #[must_use]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Parent resolution rule.
    #[must_use]
    pub fn parent_rule(self) -> ParentRule {
        match self {
            Self::Tenant => ParentRule::Root,
            Self::RoomTemplate | Self::ObjectTemplate => ParentRule::Template,
            Self::Site => ParentRule::Single(Self::Tenant),
            Self::Building => ParentRule::Single(Self::Site),
            Self::Room => ParentRule::Single(Self::Building),
            Self::Rack => ParentRule::Single(Self::Room),
            Self::RackSensor => ParentRule::Single(Self::Rack),
            Self::Device => ParentRule::Either(Self::Rack, Self::Device),
            Self::Subdevice | Self::DeviceSensor => ParentRule::Single(Self::Device),
            Self::Subdevice1 => ParentRule::Single(Self::Subdevice),
            Self::Ac
            | Self::PowerPanel
            | Self::Wall
            | Self::Cabinet
            | Self::Aisle
            | Self::Tile
            | Self::Group
            | Self::Corridor => ParentRule::Single(Self::Room),
        }
    }

    /// Primary parent kind. For [`Kind::Device`] this is [`Kind::Rack`]; a
    /// device may also hang under another device (see [`Kind::parent_rule`]).
    ///
    /// # Errors
    ///
    /// Returns [`KindError::NoParent`] for the root kind and templates.
    pub fn parent(self) -> Result<Self, KindError> {
        match self.parent_rule() {
            ParentRule::Root | ParentRule::Template => Err(KindError::NoParent(self)),
            ParentRule::Single(parent) | ParentRule::Either(parent, _) => Ok(parent),
        }
    }

    /// Next level of the facility chain (`kind + 1`), if any.
    #[must_use]
    pub fn next_level(self) -> Option<Self> {
        match self {
            Self::Tenant => Some(Self::Site),
            Self::Site => Some(Self::Building),
            Self::Building => Some(Self::Room),
            Self::Room => Some(Self::Rack),
            Self::Rack => Some(Self::Device),
            Self::Device => Some(Self::Subdevice),
            Self::Subdevice => Some(Self::Subdevice1),
            _ => None,
        }
    }

    /// Storage placement.
    #[must_use]
    pub fn placement(self) -> Placement {
        if self.is_auxiliary() {
            Placement::Nested
        } else {
            Placement::Flat
        }
    }

    /// Whether the kind belongs to the facility chain (Tenant..=Subdevice1).
    #[must_use]
    pub fn in_chain(self) -> bool {
        self <= Self::DEEPEST
    }

    /// Whether the kind uses the template schema.
    #[must_use]
    pub fn is_template(self) -> bool {
        matches!(self, Self::RoomTemplate | Self::ObjectTemplate)
    }

    /// Auxiliary kinds sit between the chain and the templates.
    #[must_use]
    pub fn is_auxiliary(self) -> bool {
        !self.in_chain() && !self.is_template()
    }

    /// Name of the array field holding nested children of this kind.
    #[must_use]
    pub fn nested_field(self) -> String {
        format!("{}s", self.name())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}
