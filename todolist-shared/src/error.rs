/// Service error taxonomy
///
/// Every operation of the credential and task services fails with one of
/// these variants. The HTTP layer maps them onto status codes:
///
/// | Variant      | Status |
/// |--------------|--------|
/// | `Validation` | 400    |
/// | `Auth`       | 401    |
/// | `Conflict`   | 409    |
/// | `NotFound`   | 404    |
/// | `Store`      | 500    |
/// | `Internal`   | 500    |
///
/// Messages for `Auth` and `NotFound` are fixed strings so a caller can never
/// tell a wrong email from a wrong password, or a foreign task from a
/// missing one.

use crate::store::StoreError;

/// Message returned for every failed login
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Message returned for every rejected bearer token
pub const INVALID_TOKEN: &str = "invalid or missing token";

/// Message returned when a task is absent or owned by someone else
pub const TASK_NOT_FOUND: &str = "task not found";

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error type shared by the credential and task services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input has the wrong shape (empty title, malformed email, ...)
    #[error("{message}")]
    Validation { field: String, message: String },

    /// Bad credentials or a missing/invalid/expired token
    #[error("{0}")]
    Auth(String),

    /// Unique constraint violated (duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Resource absent or not owned by the caller
    #[error("{0}")]
    NotFound(String),

    /// Storage backend failure
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Anything else (hashing failures, join errors)
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Builds a validation error for a single field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The one error every failed login produces
    pub fn invalid_credentials() -> Self {
        ServiceError::Auth(INVALID_CREDENTIALS.to_string())
    }

    /// The one error every rejected token produces
    pub fn invalid_token() -> Self {
        ServiceError::Auth(INVALID_TOKEN.to_string())
    }

    /// The one error a missing or foreign task produces
    pub fn task_not_found() -> Self {
        ServiceError::NotFound(TASK_NOT_FOUND.to_string())
    }
}
