//! ID logic management.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Seed and test accounts predate UUID identities and are still accepted.
const LEGACY_PREFIXES: [&str; 3] = ["admin", "builder", "homeowner"];

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
    )
    .expect("uuid pattern is valid")
});

/// Value object of a valid profile identifier.
///
/// Identifiers are issued by the identity provider and never change once the
/// profile exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileId(String);

impl ProfileId {
    /// Converts a [`String`] into a valid [`ProfileId`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is neither a UUID nor starts with one of
    /// the legacy `admin`, `builder` or `homeowner` prefixes.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if UUID.is_match(&id)
            || LEGACY_PREFIXES.iter().any(|prefix| id.starts_with(prefix))
        {
            Ok(Self(id))
        } else {
            Err(DomainError::InvalidIdFormat)
        }
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProfileId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ProfileId> for String {
    fn from(id: ProfileId) -> Self {
        id.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid() {
        for raw in [
            "3f2c1a9e-8b7d-4c6e-9a1b-2d3e4f5a6b7c",
            "3F2C1A9E-8B7D-4C6E-9A1B-2D3E4F5A6B7C",
        ] {
            assert!(ProfileId::parse(raw).is_ok());
        }
    }

    #[test]
    fn test_parse_legacy_prefixes() {
        assert!(ProfileId::parse("admin").is_ok());
        assert!(ProfileId::parse("builder-42").is_ok());
        assert!(ProfileId::parse("homeowner_jane").is_ok());
    }

    #[test]
    fn test_reject_other_shapes() {
        for id in ["", "user-1", "3f2c1a9e-8b7d-4c6e-9a1b", "Admin", " admin"] {
            assert_eq!(
                ProfileId::parse(id).unwrap_err(),
                DomainError::InvalidIdFormat,
                "{id:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_serde_validates() {
        let id: ProfileId = serde_json::from_str("\"builder1\"").unwrap();
        assert_eq!(id.as_str(), "builder1");
        assert!(serde_json::from_str::<ProfileId>("\"nobody\"").is_err());
    }
}
