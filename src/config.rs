//! Configuration manager for buildtrack.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use application::usecases::{
    DEFAULT_TEMPORARY_PASSWORD, DEFAULT_TRIGGER_DELAY, ProvisioningSettings,
};
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const SERVICE_KEY_ENV: &str = "IDENTITY_SERVICE_KEY";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to the identity provider admin API.
    #[serde(skip_serializing)]
    pub identity: Option<Identity>,
    /// Related to welcome mail sending.
    #[serde(skip_serializing)]
    pub mail: Option<Mail>,
    #[serde(default)]
    pub provisioning: Provisioning,
    /// Related to logs, traces and metrics export.
    #[serde(skip_serializing)]
    pub telemetry: Option<Telemetry>,
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Identity provider configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Base URL of the auth service.
    pub url: String,
    /// Service role key. `IDENTITY_SERVICE_KEY` takes precedence.
    pub service_key: Option<String>,
    /// Credential given to new identities until their first login.
    pub temporary_password: Option<String>,
}

/// RabbitMQ mail queue configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    /// Hostname:(?port) for RabbitMQ instance.
    pub address: String,
    /// RabbitMQ default vhost.
    pub vhost: Option<String>,
    /// RabbitMQ username to access queue.
    pub username: String,
    /// RabbitMQ password to access queue.
    pub password: String,
    /// Queue name to send mailing events.
    pub queue: String,
}

/// User provisioning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provisioning {
    /// Time given to the database trigger to create the profile row.
    pub trigger_delay_ms: u64,
}

impl Default for Provisioning {
    fn default() -> Self {
        Self {
            trigger_delay_ms: DEFAULT_TRIGGER_DELAY.as_millis() as u64,
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// OTLP gRPC collector. Logs and traces stay local when absent.
    pub otlp_endpoint: Option<String>,
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub metrics: bool,
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Self, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let config = match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader(file) {
                Ok(config) => config,
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        };

        self.finish(config, std::env::var(SERVICE_KEY_ENV).ok())
    }

    /// Stamp the version, normalize URLs and apply environment secrets.
    fn finish(
        &self,
        mut config: Configuration,
        service_key: Option<String>,
    ) -> Result<Self, url::ParseError> {
        config.version = VERSION.to_owned();
        config.path = self.path.clone();

        if let Some(identity) = config.identity.as_mut() {
            identity.url = self.normalize_url(&identity.url)?;
            if service_key.is_some() {
                identity.service_key = service_key;
            }
        }

        Ok(config)
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(
            error = %err,
            "`config.yaml` file not found or malformed"
        );
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }

    /// Settings handed to the create-user use case.
    pub fn provisioning_settings(&self) -> ProvisioningSettings {
        ProvisioningSettings {
            temporary_password: self
                .identity
                .as_ref()
                .and_then(|identity| identity.temporary_password.clone())
                .unwrap_or_else(|| DEFAULT_TEMPORARY_PASSWORD.to_string()),
            trigger_delay: Duration::from_millis(
                self.provisioning.trigger_delay_ms,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name: buildtrack
postgres:
  address: localhost:5432
  database: buildtrack
  pool_size: 4
identity:
  url: auth.example.com
  service_key: from-file
  temporary_password: Welcome1!
mail:
  address: amqp://localhost:5672
  username: guest
  password: guest
  queue: emails
provisioning:
  trigger_delay_ms: 1500
telemetry:
  metrics: true
"#;

    fn parse(yaml: &str, service_key: Option<&str>) -> Configuration {
        let config = serde_yaml::from_str(yaml).unwrap();
        Configuration::default()
            .finish(config, service_key.map(str::to_string))
            .unwrap()
    }

    #[test]
    fn test_full_configuration() {
        let config = parse(FULL, None);

        assert_eq!(config.name, "buildtrack");
        assert_eq!(config.version, VERSION);
        assert_eq!(config.postgres.unwrap().pool_size, Some(4));

        let identity = config.identity.as_ref().unwrap();
        assert_eq!(identity.url, "https://auth.example.com/");
        assert_eq!(identity.service_key.as_deref(), Some("from-file"));

        assert_eq!(config.mail.unwrap().vhost, None);
        assert!(config.telemetry.unwrap().metrics);
    }

    #[test]
    fn test_provisioning_settings() {
        let settings = parse(FULL, None).provisioning_settings();
        assert_eq!(settings.temporary_password, "Welcome1!");
        assert_eq!(settings.trigger_delay, Duration::from_millis(1500));

        let settings = parse("name: bare", None).provisioning_settings();
        assert_eq!(settings.temporary_password, "Temp123!");
        assert_eq!(settings.trigger_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_environment_service_key_wins() {
        let config = parse(FULL, Some("from-env"));
        assert_eq!(
            config.identity.unwrap().service_key.as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Configuration::default()
            .path(PathBuf::from("does/not/exist.yaml"))
            .error(std::io::Error::from(std::io::ErrorKind::NotFound));

        assert_eq!(config.version, VERSION);
        assert!(config.identity.is_none());
        assert_eq!(config.provisioning, Provisioning::default());
    }

    #[test]
    fn test_invalid_identity_url() {
        let config =
            serde_yaml::from_str("name: x\nidentity:\n  url: 'http://'\n")
                .unwrap();
        assert!(Configuration::default().finish(config, None).is_err());
    }
}
