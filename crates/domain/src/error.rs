//! Custom error handler for domain (core).

pub type Result<T> = std::result::Result<T, DomainError>;

/// Enum representing custom domain errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("invalid email formatting")]
    InvalidEmailFormat,
    #[error(
        "id must be a UUID or a legacy `admin`, `builder` or `homeowner` id"
    )]
    InvalidIdFormat,
    #[error("unknown role `{0}`")]
    InvalidRole(String),

    #[error("year filter must be `All` or a calendar year")]
    InvalidYear,
    #[error("month filter must be `All` or an English month name")]
    InvalidMonth,
}
