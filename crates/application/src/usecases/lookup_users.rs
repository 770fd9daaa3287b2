//! Profile lookup use case implementation.

use std::sync::Arc;

use async_trait::async_trait;
use domain::identity::email::EmailAddress;
use domain::identity::id::ProfileId;
use domain::identity::profile::Profile;

use crate::error::{Result, StoreContext};
use crate::ports::inbound::LookupUsers;
use crate::ports::outbound::ProfileRepository;

/// Profile lookup use case service.
#[derive(Clone)]
pub struct LookupUsersUseCase {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl LookupUsersUseCase {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }
}

#[async_trait]
impl LookupUsers for LookupUsersUseCase {
    async fn list(&self) -> Result<Vec<Profile>> {
        self.profile_repo
            .find_all()
            .await
            .context("failed to fetch users")
    }

    async fn by_id(&self, user_id: &str) -> Result<Option<Profile>> {
        let Ok(id) = ProfileId::parse(user_id) else {
            tracing::error!(user_id, "invalid id format");
            return Ok(None);
        };

        self.profile_repo
            .find_by_id(&id)
            .await
            .context("failed to fetch user")
    }

    async fn by_email(&self, email: &str) -> Result<Profile> {
        let email = EmailAddress::parse(email)?;

        self.profile_repo
            .find_by_email(&email)
            .await
            .context("failed to fetch user by email")
    }
}
