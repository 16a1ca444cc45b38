//! Common error types used across the workspace.
//!
//! Every operation of the hierarchy engine reports one of four outcomes to
//! its caller. The `Display` form of [`InfraTreeError`] is the stable
//! sentinel string callers match on (`"validate"`, `"record not found"`,
//! `"duplicate"`); the detailed reason stays reachable through
//! [`std::error::Error::source`].

use crate::id::InvalidObjectId;
use crate::kind::{Kind, KindError, Placement};

/// Sentinel for a rejected payload.
pub const VALIDATE: &str = "validate";
/// Sentinel for a missing record.
pub const RECORD_NOT_FOUND: &str = "record not found";
/// Sentinel for a nested name collision.
pub const DUPLICATE: &str = "duplicate";

/// Coarse classification of an [`InfraTreeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Duplicate,
    Internal,
}

/// Top-level error returned by every store operation.
#[derive(Debug, thiserror::Error)]
pub enum InfraTreeError {
    /// The payload failed a structural check before any write happened.
    #[error("validate")]
    Validation(#[from] ValidationError),

    /// The requested record (or one on the way to it) does not exist.
    #[error("record not found")]
    NotFound(#[from] NotFoundError),

    /// A nested sibling already carries the requested name.
    #[error("duplicate")]
    Duplicate(#[from] DuplicateError),

    /// The backing store failed; the message is opaque to callers.
    #[error("{0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

impl InfraTreeError {
    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Duplicate(_) => ErrorKind::Duplicate,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Human-readable reason, more detailed than the sentinel.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::NotFound(err) => err.to_string(),
            Self::Duplicate(err) => err.to_string(),
            Self::Storage(err) => err.to_string(),
        }
    }
}

impl From<KindError> for InfraTreeError {
    fn from(err: KindError) -> Self {
        Self::Validation(ValidationError::Kind(err))
    }
}

impl From<InvalidObjectId> for InfraTreeError {
    fn from(err: InvalidObjectId) -> Self {
        Self::Validation(ValidationError::InvalidId(err))
    }
}

/// Reasons a document is rejected by the Validation Engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} should be on the payload")]
    MissingField { field: &'static str },

    #[error("{field} must be a {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("domain must be absent for {kind}")]
    DomainMustBeAbsent { kind: Kind },

    #[error("attributes should be on the payload")]
    MissingAttributes,

    #[error("{field} attribute must be specified for {kind}")]
    MissingAttribute { kind: Kind, field: &'static str },

    #[error("orientation {value:?} is invalid for {kind}")]
    InvalidOrientation { kind: Kind, value: String },

    #[error(transparent)]
    InvalidId(#[from] InvalidObjectId),

    #[error("parentId {0:?} is not a valid identifier")]
    InvalidParentId(String),

    #[error("path step {0:?} is not of the form kind=name")]
    InvalidPathStep(String),

    #[error("parentId {id} does not match an existing {expected}")]
    ParentNotFound { expected: String, id: String },

    #[error("{kind} is stored {actual}, not {requested}")]
    WrongPlacement {
        kind: Kind,
        actual: Placement,
        requested: Placement,
    },

    #[error("{kind} cannot be reached through {parent}")]
    UnrelatedParent { kind: Kind, parent: Kind },

    #[error("path ended in a {actual}, expected a {expected}")]
    UnexpectedResolution {
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Kind(#[from] KindError),
}

/// Details about which record could not be found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {key}")]
pub struct NotFoundError {
    /// Collection or kind name (e.g. `"rack"`).
    pub entity: &'static str,
    /// Identifier, name or slug that was looked up.
    pub key: String,
}

/// A nested sibling with the same name already exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a {kind} named {name:?} already exists under {parent_id}")]
pub struct DuplicateError {
    pub kind: Kind,
    pub name: String,
    pub parent_id: String,
}
