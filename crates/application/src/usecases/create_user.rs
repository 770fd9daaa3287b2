//! User creation use case implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::identity::email::EmailAddress;
use domain::identity::patch::ProfileChanges;
use domain::identity::profile::Profile;
use validator::Validate;

use crate::dto::{
    CreateUserRequestDto, IdentityMetadata, NewIdentity, ProvisionPath,
};
use crate::error::{Result, StoreContext};
use crate::ports::inbound::CreateUser;
use crate::ports::outbound::{
    Clock, IdentityProvider, Mailer, ProfileRepository, TelemetryPort,
};

/// Credential handed to new identities until their first login.
pub const DEFAULT_TEMPORARY_PASSWORD: &str = "Temp123!";
/// Time given to the database trigger to materialize the profile row.
pub const DEFAULT_TRIGGER_DELAY: Duration = Duration::from_millis(500);

/// Tunables of the provisioning flow.
#[derive(Debug, Clone)]
pub struct ProvisioningSettings {
    pub temporary_password: String,
    pub trigger_delay: Duration,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            temporary_password: DEFAULT_TEMPORARY_PASSWORD.to_string(),
            trigger_delay: DEFAULT_TRIGGER_DELAY,
        }
    }
}

/// User creation use case service.
pub struct CreateUserUseCase {
    identity: Box<dyn IdentityProvider>,
    profile_repo: Arc<dyn ProfileRepository>,
    mailer: Box<dyn Mailer>,
    telemetry: Arc<dyn TelemetryPort>,
    clock: Box<dyn Clock>,
    settings: ProvisioningSettings,
}

impl CreateUserUseCase {
    pub fn new(
        identity: Box<dyn IdentityProvider>,
        profile_repo: Arc<dyn ProfileRepository>,
        mailer: Box<dyn Mailer>,
        telemetry: Arc<dyn TelemetryPort>,
        clock: Box<dyn Clock>,
        settings: ProvisioningSettings,
    ) -> Self {
        Self {
            identity,
            profile_repo,
            mailer,
            telemetry,
            clock,
            settings,
        }
    }
}

#[async_trait]
impl CreateUser for CreateUserUseCase {
    async fn execute(&self, request: CreateUserRequestDto) -> Result<Profile> {
        request.validate()?;
        let email = EmailAddress::parse(request.email.as_str())?;

        let user_id = self
            .identity
            .create_identity(&NewIdentity {
                email: email.clone(),
                password: self.settings.temporary_password.clone(),
                email_confirm: true,
                metadata: IdentityMetadata {
                    name: request.name.clone(),
                    role: request.role,
                },
            })
            .await?;

        // The profile row is created by a database trigger we do not
        // control. Nothing guarantees it has run once this delay elapses.
        tokio::time::sleep(self.settings.trigger_delay).await;

        let existing = self
            .profile_repo
            .find_by_id(&user_id)
            .await
            .context("failed to fetch profile")
            .inspect_err(|err| {
                tracing::error!(
                    user_id = %user_id,
                    error = %err,
                    "identity created without a profile"
                );
            })?;

        let (profile, path) = match existing {
            Some(_) => {
                let changes = ProfileChanges {
                    name: Some(request.name),
                    role: Some(request.role),
                    // Absent optional fields never overwrite the row.
                    phone: request.phone.map(Some),
                    first_name: request.first_name.map(Some),
                    last_name: request.last_name.map(Some),
                    builder_id: request.builder_id.map(Some),
                };
                let profile = self
                    .profile_repo
                    .update(&user_id, &changes)
                    .await
                    .context("failed to update profile")?;
                (profile, ProvisionPath::Updated)
            },
            None => {
                let profile = Profile {
                    id: user_id.clone(),
                    email,
                    name: request.name,
                    role: request.role,
                    phone: request.phone,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    created_at: self.clock.now(),
                    builder_id: request.builder_id,
                };
                let profile = self
                    .profile_repo
                    .insert(&profile)
                    .await
                    .context("failed to create profile")?;
                (profile, ProvisionPath::Inserted)
            },
        };

        self.telemetry.record_user_created(profile.id.as_str(), path);

        tracing::info!(
            user_id = %profile.id,
            email = %profile.email,
            "sending welcome email"
        );
        if let Err(err) = self.mailer.send_welcome(&profile).await {
            tracing::error!(
                user_id = %profile.id,
                error = %err,
                "failed to send welcome email"
            );
            self.telemetry.record_welcome_failed(profile.id.as_str());
        }

        Ok(profile)
    }
}
