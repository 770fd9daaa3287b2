//! Interface for the external identity provider.

use async_trait::async_trait;
use domain::identity::id::ProfileId;

use crate::dto::NewIdentity;
use crate::error::Result;

/// Port creating authentication identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an identity and return the identifier it was issued.
    ///
    /// Failures are reported as [`Provisioning`] errors carrying the upstream
    /// message.
    ///
    /// [`Provisioning`]: crate::error::ApplicationError::Provisioning
    async fn create_identity(
        &self,
        identity: &NewIdentity,
    ) -> Result<ProfileId>;
}
