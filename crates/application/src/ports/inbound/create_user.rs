//! User creation use case port.

use async_trait::async_trait;
use domain::identity::profile::Profile;

use crate::dto::CreateUserRequestDto;
use crate::error::Result;

/// Inbound port for user creation.
#[async_trait]
pub trait CreateUser: Send + Sync {
    /// Provision an identity and its profile.
    async fn execute(&self, request: CreateUserRequestDto) -> Result<Profile>;
}
