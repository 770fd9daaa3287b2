//! Application-level errors.

use domain::error::DomainError;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ApplicationError>;

/// Structured failure of a profile store call.
///
/// Callers branch on the variant, never on the backend message.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no rows found")]
    NotFound,
    #[error("more than one row matched a single-row lookup")]
    MultipleRows,
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Errors that can occur in the application layer.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("validation error occurred: {0}")]
    Validation(#[from] ValidationErrors),

    /// The identity provider refused or failed to create the identity.
    #[error("failed to create auth user: {0}")]
    Provisioning(String),
    /// A profile store call failed; `context` names the operation.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("failed to send notification: {0}")]
    Notification(Box<dyn std::error::Error + Send + Sync>),
}

impl ApplicationError {
    pub fn notification<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Notification(Box::new(err))
    }

    /// Store failure kind, if this error wraps one.
    pub fn store_kind(&self) -> Option<&StoreError> {
        match self {
            Self::Store { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Prefix store failures with the operation that triggered them.
pub trait StoreContext<T> {
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> StoreContext<T> for std::result::Result<T, StoreError> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| ApplicationError::Store { context, source })
    }
}
