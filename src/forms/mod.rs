//! Form definitions backing the booking routes.

use thiserror::Error;
use validator::ValidationErrors;

pub mod bookings;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid filter field: {0}")]
    InvalidFilterField(String),
}
