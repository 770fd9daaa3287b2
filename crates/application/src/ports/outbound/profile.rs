//! Profile repository port.

use async_trait::async_trait;
use domain::identity::email::EmailAddress;
use domain::identity::id::ProfileId;
use domain::identity::patch::ProfileChanges;
use domain::identity::profile::Profile;

use crate::error::StoreError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Port for profile table operations.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Every profile, in no particular order.
    async fn find_all(&self) -> StoreResult<Vec<Profile>>;

    /// Find a profile by ID. A missing row is `Ok(None)`.
    async fn find_by_id(&self, id: &ProfileId) -> StoreResult<Option<Profile>>;

    /// Find the single profile owning `email`.
    ///
    /// Fails with [`StoreError::NotFound`] or [`StoreError::MultipleRows`]
    /// unless exactly one row matches.
    async fn find_by_email(&self, email: &EmailAddress) -> StoreResult<Profile>;

    /// Insert a new profile and return the stored row.
    async fn insert(&self, profile: &Profile) -> StoreResult<Profile>;

    /// Apply the `Some` fields of `changes` and return the updated row.
    async fn update(
        &self,
        id: &ProfileId,
        changes: &ProfileChanges,
    ) -> StoreResult<Profile>;
}
