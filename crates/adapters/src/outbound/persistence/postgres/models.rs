//! Database models for PostgreSQL.

use application::error::StoreError;
use chrono::{DateTime, Utc};
use domain::identity::email::EmailAddress;
use domain::identity::id::ProfileId;
use domain::identity::profile::{Profile, Role};
use sqlx::FromRow;

/// Profile row as stored in the database.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub builder_id: Option<String>,
}

impl ProfileRecord {
    /// Convert to [`Profile`], rejecting rows the domain would never produce.
    pub fn try_into_profile(self) -> Result<Profile, StoreError> {
        Ok(Profile {
            id: ProfileId::parse(self.id).map_err(StoreError::backend)?,
            email: EmailAddress::parse(self.email)
                .map_err(StoreError::backend)?,
            name: self.name,
            role: self.role.parse::<Role>().map_err(StoreError::backend)?,
            phone: self.phone,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: self.created_at,
            builder_id: self
                .builder_id
                .map(ProfileId::parse)
                .transpose()
                .map_err(StoreError::backend)?,
        })
    }
}

impl From<&Profile> for ProfileRecord {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            email: profile.email.as_str().to_string(),
            name: profile.name.clone(),
            role: profile.role.as_str().to_string(),
            phone: profile.phone.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            created_at: profile.created_at,
            builder_id: profile.builder_id.as_ref().map(ToString::to_string),
        }
    }
}
