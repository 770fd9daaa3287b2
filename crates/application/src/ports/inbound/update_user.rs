//! Profile update use case port.

use async_trait::async_trait;
use domain::identity::patch::ProfilePatch;
use domain::identity::profile::Profile;

use crate::error::Result;

/// Inbound port for profile updates.
#[async_trait]
pub trait UpdateUser: Send + Sync {
    /// Apply the persistable part of `patch` to the profile `user_id`.
    ///
    /// When nothing persistable remains, no write happens and the current
    /// profile is returned instead (`None` if it cannot be found).
    async fn execute(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<Option<Profile>>;
}
