//! Interface for email operations.

use async_trait::async_trait;
use domain::identity::profile::Profile;

use crate::error::Result;

/// Port for sending emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a welcome email to a freshly provisioned user.
    async fn send_welcome(&self, profile: &Profile) -> Result<()>;
}
