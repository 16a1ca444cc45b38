//! Per-kind `attributes` sub-schemas.

use std::str::FromStr;

use serde_json::Value;

use super::orientation::{DeviceOrientation, RackOrientation, RoomOrientation, SiteOrientation};
use crate::document::Document;
use crate::error::ValidationError;
use crate::kind::Kind;
use crate::validation::{Fields, SubdeviceRule, ValidationPolicy};

/// Validated `attributes` of a standard kind.
#[derive(Debug, Clone, PartialEq)]
pub enum KindAttributes {
    Tenant(TenantAttributes),
    Site(SiteAttributes),
    Building(Footprint),
    Room(RoomAttributes),
    Rack(RackAttributes),
    Device(DeviceAttributes),
    /// Subdevice and Subdevice1; constrained only under [`SubdeviceRule::Device`].
    Subdevice(Option<DeviceAttributes>),
    /// Auxiliary kinds accept any attribute document.
    Unconstrained,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TenantAttributes {
    pub color: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteAttributes {
    pub orientation: SiteOrientation,
    pub usable_color: String,
    pub reserved_color: String,
    pub technical_color: String,
}

/// Position and extent shared by buildings, rooms and racks.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub pos_xy: Value,
    pub pos_xy_unit: String,
    pub size: Value,
    pub size_unit: String,
    pub height: Value,
    pub height_unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomAttributes {
    pub footprint: Footprint,
    pub orientation: RoomOrientation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RackAttributes {
    pub footprint: Footprint,
    pub orientation: RackOrientation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceAttributes {
    pub orientation: DeviceOrientation,
    pub size: Value,
    pub size_unit: String,
    pub height: Value,
    pub height_unit: String,
}

impl KindAttributes {
    /// Validate `attrs` against the sub-schema of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAttribute`] for an absent key,
    /// [`ValidationError::InvalidOrientation`] for an unknown code, and
    /// [`ValidationError::InvalidType`] for a non-string unit or colour.
    pub fn parse(
        kind: Kind,
        attrs: &Document,
        policy: &ValidationPolicy,
    ) -> Result<Self, ValidationError> {
        let fields = Fields::attributes(attrs, kind);
        let parsed = match kind {
            Kind::Tenant => Self::Tenant(TenantAttributes {
                color: fields.required("color")?.clone(),
            }),
            Kind::Site => Self::Site(SiteAttributes {
                orientation: orientation(&fields, kind)?,
                usable_color: fields.required_str("usableColor")?.to_string(),
                reserved_color: fields.required_str("reservedColor")?.to_string(),
                technical_color: fields.required_str("technicalColor")?.to_string(),
            }),
            Kind::Building => Self::Building(Footprint::parse(&fields)?),
            Kind::Room => Self::Room(RoomAttributes {
                footprint: Footprint::parse(&fields)?,
                orientation: orientation(&fields, kind)?,
            }),
            Kind::Rack => Self::Rack(RackAttributes {
                footprint: Footprint::parse(&fields)?,
                orientation: orientation(&fields, kind)?,
            }),
            Kind::Device => Self::Device(DeviceAttributes::parse(&fields, kind)?),
            Kind::Subdevice | Kind::Subdevice1 => match policy.subdevice_attributes {
                SubdeviceRule::Unconstrained => Self::Subdevice(None),
                SubdeviceRule::Device => {
                    Self::Subdevice(Some(DeviceAttributes::parse(&fields, kind)?))
                }
            },
            Kind::Ac
            | Kind::PowerPanel
            | Kind::Wall
            | Kind::Cabinet
            | Kind::Aisle
            | Kind::Tile
            | Kind::Group
            | Kind::Corridor
            | Kind::RackSensor
            | Kind::DeviceSensor
            | Kind::RoomTemplate
            | Kind::ObjectTemplate => Self::Unconstrained,
        };
        Ok(parsed)
    }
}

impl Footprint {
    fn parse(fields: &Fields<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            pos_xy: fields.required("posXY")?.clone(),
            pos_xy_unit: fields.required_str("posXYUnit")?.to_string(),
            size: fields.required("size")?.clone(),
            size_unit: fields.required_str("sizeUnit")?.to_string(),
            height: fields.required("height")?.clone(),
            height_unit: fields.required_str("heightUnit")?.to_string(),
        })
    }
}

impl DeviceAttributes {
    fn parse(fields: &Fields<'_>, kind: Kind) -> Result<Self, ValidationError> {
        Ok(Self {
            orientation: orientation(fields, kind)?,
            size: fields.required("size")?.clone(),
            size_unit: fields.required_str("sizeUnit")?.to_string(),
            height: fields.required("height")?.clone(),
            height_unit: fields.required_str("heightUnit")?.to_string(),
        })
    }
}

fn orientation<T: FromStr>(fields: &Fields<'_>, kind: Kind) -> Result<T, ValidationError> {
    let code = fields.required_str("orientation")?;
    code.parse().map_err(|_| ValidationError::InvalidOrientation {
        kind,
        value: code.to_string(),
    })
}
