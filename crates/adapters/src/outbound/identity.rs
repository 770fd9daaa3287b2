//! Identity provider speaking the GoTrue admin API.

use application::dto::NewIdentity;
use application::error::{ApplicationError, Result};
use application::ports::outbound::IdentityProvider;
use async_trait::async_trait;
use domain::identity::id::ProfileId;
use serde::{Deserialize, Serialize};
use url::Url;

const ADMIN_USERS_PATH: &str = "auth/v1/admin/users";

#[derive(Debug, Serialize)]
struct CreateUserBody<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
    user_metadata: UserMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct UserMetadata<'a> {
    name: &'a str,
    role: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedUser {
    id: String,
}

/// Error payloads vary between GoTrue versions.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Extract the most specific message out of an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| body.to_string())
}

/// Admin client creating identities with the service key.
pub struct GoTrueIdentityProvider {
    client: reqwest::Client,
    endpoint: Url,
    service_key: String,
}

impl GoTrueIdentityProvider {
    /// Create a new [`GoTrueIdentityProvider`] rooted at `base_url`.
    pub fn new(base_url: &str, service_key: impl Into<String>) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|err| ApplicationError::Provisioning(err.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(ADMIN_USERS_PATH)
            .map_err(|err| ApplicationError::Provisioning(err.to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            service_key: service_key.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoTrueIdentityProvider {
    async fn create_identity(
        &self,
        identity: &NewIdentity,
    ) -> Result<ProfileId> {
        let body = CreateUserBody {
            email: identity.email.as_str(),
            password: &identity.password,
            email_confirm: identity.email_confirm,
            user_metadata: UserMetadata {
                name: &identity.metadata.name,
                role: identity.metadata.role.as_str(),
            },
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "identity provider unreachable");
                ApplicationError::Provisioning(err.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ApplicationError::Provisioning(err.to_string()))?;

        if !status.is_success() {
            let message = error_message(&text);
            tracing::error!(
                %status,
                email = %identity.email,
                error = %message,
                "identity creation refused"
            );
            return Err(ApplicationError::Provisioning(message));
        }

        let created: CreatedUser = serde_json::from_str(&text)
            .map_err(|err| ApplicationError::Provisioning(err.to_string()))?;
        let id = ProfileId::parse(created.id)?;

        tracing::debug!(user_id = %id, "identity created");
        Ok(id)
    }
}
