//! Email logic management.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Value object of a valid email address, always lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Converts a [`String`] into a canonical [`EmailAddress`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not contain exactly one `@`.
    pub fn parse(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        let email = email.trim();
        if email.split('@').count() == 2 {
            Ok(Self(email.to_lowercase()))
        } else {
            Err(DomainError::InvalidEmailFormat)
        }
    }

    /// Part before the `@`.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    /// Returns the same string as a string slice `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
