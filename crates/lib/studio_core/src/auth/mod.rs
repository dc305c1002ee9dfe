//! Account lifecycle and authorization.
//!
//! Credential storage, confirmation tokens, login sessions, the per-request
//! access gate and the registration/confirmation workflow. Shared by every
//! HTTP handler in `studio_api`.

pub mod access;
pub mod confirmation;
pub mod credentials;
pub mod password;
pub mod roles;
pub mod session;
pub mod token;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately silent about whether the email or the password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} is already registered")]
    DuplicateIdentity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => AuthError::DuplicateIdentity(field),
            other => AuthError::Store(other),
        }
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
