//! Welcome mailer using RabbitMQ for async email sending.

use std::str::FromStr;
use std::sync::Arc;

use application::error::{ApplicationError, Result};
use application::ports::outbound::Mailer;
use async_trait::async_trait;
use chrono::Utc;
use domain::identity::profile::Profile;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::uri::{
    AMQPAuthority, AMQPQueryString, AMQPScheme, AMQPUri, AMQPUserInfo,
};
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, RecoveryConfig,
};
use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;
use serde::Serialize;
use url::Url;

const DEFAULT_AMPQ_HOST: &str = "localhost";
const DEFAULT_AMPQ_PORT: u16 = 5672;

const CONTENT_ENCODING: &str = "utf8";
const CONTENT_TYPE: &str = "application/cloudevents+json";
const DATA_CONTENT_TYPE: &str = "application/json";
const CLOUDEVENT_VERSION: &str = "1.0";
const EVENT_TYPE: &str = "com.buildtrack.email";
const EVENT_SOURCE: &str = "com.buildtrack.provisioning";
const ID_LENGTH: usize = 12;

/// Mail templates list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Template {
    /// Greets a freshly provisioned user.
    Welcome,
}

#[derive(Debug, Serialize)]
struct Cloudevent<'a> {
    specversion: &'static str,
    r#type: &'static str,
    source: &'static str,
    id: String,
    time: String,
    datacontenttype: &'static str,
    data: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    to: &'a str,
    template: Template,
    name: &'a str,
    role: &'a str,
}

/// RabbitMQ-based mailer adapter.
pub struct RabbitMqMailer {
    conn: Option<Arc<Connection>>,
    queue_name: String,
}

impl RabbitMqMailer {
    /// Create a new [`RabbitMqMailer`].
    pub async fn new(
        address: &str,
        username: &str,
        password: &str,
        vhost: &str,
        queue_name: &str,
    ) -> Result<Self> {
        let addr = Url::parse(address).map_err(ApplicationError::notification)?;
        let uri = AMQPUri {
            scheme: AMQPScheme::from_str(addr.scheme())
                .map_err(|err| ApplicationError::Notification(err.into()))?,
            authority: AMQPAuthority {
                userinfo: AMQPUserInfo {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                host: addr.host_str().unwrap_or(DEFAULT_AMPQ_HOST).into(),
                port: addr.port().unwrap_or(DEFAULT_AMPQ_PORT),
            },
            vhost: vhost.to_string(),
            query: AMQPQueryString {
                channel_max: Some(10),
                ..Default::default()
            },
        };

        let recovery_config =
            RecoveryConfig::default().auto_recover_connection();
        let conn_config = ConnectionProperties::default()
            .with_connection_name("buildtrack_mail_client".into())
            .with_experimental_recovery_config(recovery_config);
        let conn = Connection::connect_uri(uri, conn_config)
            .await
            .map_err(ApplicationError::notification)?;

        tracing::info!(%addr, queue = queue_name, "rabbitmq connected");

        Ok(Self {
            queue_name: queue_name.to_string(),
            conn: Some(Arc::new(conn)),
        })
    }

    /// Mailer without a broker: every message is logged and dropped.
    pub fn disabled() -> Self {
        Self {
            conn: None,
            queue_name: String::new(),
        }
    }

    async fn create_channel(
        conn: Arc<Connection>,
        queue: &str,
    ) -> Result<Channel> {
        let channel = conn
            .create_channel()
            .await
            .map_err(ApplicationError::notification)?;
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(ApplicationError::notification)?;
        Ok(channel)
    }

    fn create_event(data: Content) -> Cloudevent {
        let id = Alphanumeric.sample_string(&mut OsRng, ID_LENGTH);
        Cloudevent {
            specversion: CLOUDEVENT_VERSION,
            r#type: EVENT_TYPE,
            source: EVENT_SOURCE,
            id,
            time: Utc::now().to_rfc3339(),
            datacontenttype: DATA_CONTENT_TYPE,
            data,
        }
    }

    async fn publish<'a>(&self, message: Content<'a>) -> Result<()> {
        let Some(conn) = &self.conn else {
            tracing::debug!(
                to = message.to,
                "mailer disabled, message dropped"
            );
            return Ok(());
        };
        let channel =
            Self::create_channel(Arc::clone(conn), &self.queue_name).await?;

        let payload = Self::create_event(message);
        let payload = serde_json::to_vec(&payload)
            .map_err(ApplicationError::notification)?;

        channel
            .basic_publish(
                "",
                &self.queue_name,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default()
                    .with_content_encoding(CONTENT_ENCODING.into())
                    .with_content_type(CONTENT_TYPE.into()),
            )
            .await
            .map_err(ApplicationError::notification)?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for RabbitMqMailer {
    async fn send_welcome(&self, profile: &Profile) -> Result<()> {
        let message = Content {
            template: Template::Welcome,
            to: profile.email.as_str(),
            name: profile.greeting_name(),
            role: profile.role.as_str(),
        };

        self.publish(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use domain::identity::email::EmailAddress;
    use domain::identity::id::ProfileId;
    use domain::identity::profile::Role;

    #[test]
    fn test_welcome_event_envelope() {
        let event = RabbitMqMailer::create_event(Content {
            to: "jane@example.com",
            template: Template::Welcome,
            name: "Jane",
            role: "homeowner",
        });
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["specversion"], "1.0");
        assert_eq!(value["type"], "com.buildtrack.email");
        assert_eq!(value["datacontenttype"], "application/json");
        assert_eq!(value["id"].as_str().unwrap().len(), ID_LENGTH);
        let time = value["time"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(time).is_ok());
        assert_eq!(
            value["data"],
            serde_json::json!({
                "to": "jane@example.com",
                "template": "welcome",
                "name": "Jane",
                "role": "homeowner",
            })
        );
    }

    #[tokio::test]
    async fn test_disabled_mailer_accepts_messages() {
        let profile = Profile {
            id: ProfileId::parse("homeowner1").unwrap(),
            email: EmailAddress::parse("jane@example.com").unwrap(),
            name: "Jane Doe".into(),
            role: Role::Homeowner,
            phone: None,
            first_name: None,
            last_name: None,
            created_at: Utc::now(),
            builder_id: None,
        };

        let mailer = RabbitMqMailer::disabled();
        assert!(mailer.send_welcome(&profile).await.is_ok());
    }
}
