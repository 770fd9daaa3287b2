//! Start-up errors for buildtrack.

use application::error::ApplicationError;
use thiserror::Error;

/// Failures while wiring adapters and telemetry together.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid configuration: {0}")]
    Config(#[from] url::ParseError),

    #[error("missing `{0}` entry on `config.yaml` file")]
    MissingEntry(&'static str),

    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("adapter start-up failed: {0}")]
    Adapter(#[from] ApplicationError),

    #[error("telemetry start-up failed: {0}")]
    Telemetry(Box<dyn std::error::Error + Send + Sync>),
}

impl BootstrapError {
    pub fn telemetry<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Telemetry(Box::new(err))
    }
}
