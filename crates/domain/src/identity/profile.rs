//! Profile domain entity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::identity::email::EmailAddress;
use crate::identity::id::ProfileId;

/// Role granted to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Builder,
    Homeowner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Builder => "builder",
            Role::Homeowner => "homeowner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "builder" => Ok(Role::Builder),
            "homeowner" => Ok(Role::Homeowner),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

/// A user as persisted in the profile table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub email: EmailAddress,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Builder a homeowner is linked to.
    pub builder_id: Option<ProfileId>,
}

impl Profile {
    /// Name used to greet the user: first name, else the first word of the
    /// display name, else the local part of the email.
    pub fn greeting_name(&self) -> &str {
        self.first_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.name.split_whitespace().next())
            .unwrap_or_else(|| self.email.local_part())
    }
}
