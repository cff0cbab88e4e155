use thiserror::Error;

use crate::domain::booking::ConfigurationError;
use crate::repository::errors::RepositoryError;

/// Errors surfaced by the booking report services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("query error: {0}")]
    Query(#[from] RepositoryError),

    #[error("export error: {0}")]
    Export(String),

    #[error("form error: {0}")]
    Form(String),

    #[error("another operation is already in progress")]
    Busy,

    #[error("type constraint violation: {0}")]
    TypeConstraint(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
