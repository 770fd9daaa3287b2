//! Profile update use case implementation.

use std::sync::Arc;

use async_trait::async_trait;
use domain::identity::id::ProfileId;
use domain::identity::patch::{ProfilePatch, sanitize};
use domain::identity::profile::Profile;

use crate::error::{Result, StoreContext};
use crate::ports::inbound::{LookupUsers, UpdateUser};
use crate::ports::outbound::{ProfileRepository, TelemetryPort};
use crate::usecases::LookupUsersUseCase;

/// Profile update use case service.
pub struct UpdateUserUseCase {
    profile_repo: Arc<dyn ProfileRepository>,
    lookup: LookupUsersUseCase,
    telemetry: Arc<dyn TelemetryPort>,
}

impl UpdateUserUseCase {
    pub fn new(
        profile_repo: Arc<dyn ProfileRepository>,
        telemetry: Arc<dyn TelemetryPort>,
    ) -> Self {
        Self {
            lookup: LookupUsersUseCase::new(Arc::clone(&profile_repo)),
            profile_repo,
            telemetry,
        }
    }
}

#[async_trait]
impl UpdateUser for UpdateUserUseCase {
    async fn execute(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<Option<Profile>> {
        let sanitized = sanitize(patch);

        if sanitized.changes.is_empty() {
            tracing::warn!(user_id, "no valid fields provided for update");
            self.telemetry.record_update_skipped(user_id);
            return self.lookup.by_id(user_id).await;
        }

        let id = ProfileId::parse(user_id)?;
        let profile = self
            .profile_repo
            .update(&id, &sanitized.changes)
            .await
            .context("failed to update user profile")?;

        Ok(Some(profile))
    }
}
