//! Profile lookup port.

use async_trait::async_trait;
use domain::identity::profile::Profile;

use crate::error::Result;

/// Inbound port for reading profiles.
#[async_trait]
pub trait LookupUsers: Send + Sync {
    /// Every profile.
    async fn list(&self) -> Result<Vec<Profile>>;

    /// Profile for `user_id`. Malformed identifiers yield `Ok(None)`
    /// without reaching the store.
    async fn by_id(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Profile owning `email`, compared lower-cased.
    async fn by_email(&self, email: &str) -> Result<Profile>;
}
