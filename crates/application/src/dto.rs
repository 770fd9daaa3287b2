//! Data Transfer Objects for the application layer.

use domain::identity::email::EmailAddress;
use domain::identity::id::ProfileId;
use domain::identity::profile::Role;
use validator::Validate;

/// Request DTO for user creation.
#[derive(Debug, Clone, Validate)]
pub struct CreateUserRequestDto {
    /// Email address, lower-cased before use.
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    /// Display name.
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be 1 to 100 characters long."
    ))]
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Builder a homeowner is linked to. Never written when absent.
    pub builder_id: Option<ProfileId>,
}

/// Identity creation request sent to the identity provider.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: EmailAddress,
    /// Temporary credential, to be replaced on first login.
    pub password: String,
    /// Skip the verification email.
    pub email_confirm: bool,
    pub metadata: IdentityMetadata,
}

/// Denormalized profile data stored alongside the identity.
#[derive(Debug, Clone)]
pub struct IdentityMetadata {
    pub name: String,
    pub role: Role,
}

/// Which store write materialized a new profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionPath {
    /// The trigger created the row; caller fields were written over it.
    Updated,
    /// No row yet; the profile was inserted directly.
    Inserted,
}

impl ProvisionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionPath::Updated => "update",
            ProvisionPath::Inserted => "insert",
        }
    }
}
