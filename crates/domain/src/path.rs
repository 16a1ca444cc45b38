//! Steps of an ancestor path, as accepted by the resolver.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::kind::Kind;

/// Step value that lists every child of the kind instead of picking one.
pub const WILDCARD: &str = "all";

/// One `(kind, name)` hop below the previously resolved entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub kind: Kind,
    pub name: String,
}

impl PathStep {
    #[must_use]
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Step listing every child of `kind`.
    #[must_use]
    pub fn all(kind: Kind) -> Self {
        Self::new(kind, WILDCARD)
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.name)
    }
}

impl FromStr for PathStep {
    type Err = ValidationError;

    /// Parse `kind=name`. The name may itself contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once('=')
            .filter(|(_, name)| !name.is_empty())
            .ok_or_else(|| ValidationError::InvalidPathStep(s.to_string()))?;
        Ok(Self::new(kind.parse()?, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::KindError;

    #[test]
    fn should_parse_kind_and_name() {
        let step: PathStep = "rack=R01".parse().unwrap();
        assert_eq!(step, PathStep::new(Kind::Rack, "R01"));
        assert!(!step.is_wildcard());
    }

    #[test]
    fn should_recognize_wildcard() {
        let step: PathStep = "device=all".parse().unwrap();
        assert!(step.is_wildcard());
        assert_eq!(step, PathStep::all(Kind::Device));
    }

    #[test]
    fn should_keep_equal_signs_in_name() {
        let step: PathStep = "room=a=b".parse().unwrap();
        assert_eq!(step.name, "a=b");
    }

    #[test]
    fn should_reject_step_without_name() {
        assert_eq!(
            "rack".parse::<PathStep>(),
            Err(ValidationError::InvalidPathStep("rack".to_string()))
        );
        assert_eq!(
            "rack=".parse::<PathStep>(),
            Err(ValidationError::InvalidPathStep("rack=".to_string()))
        );
    }

    #[test]
    fn should_reject_unknown_kind() {
        assert_eq!(
            "spaceship=x".parse::<PathStep>(),
            Err(ValidationError::Kind(KindError::UnknownKind(
                "spaceship".to_string()
            )))
        );
    }

    #[test]
    fn should_display_as_parsed() {
        assert_eq!(PathStep::new(Kind::Room, "R1").to_string(), "room=R1");
    }
}
