//! Global application error types.
//!
//! `StoreError` is what user repositories return, `SessionError` is what the
//! session manager returns and `ApiError` is the HTTP-facing error every
//! handler and middleware stage resolves to.

use crate::database::models::validation_message;
use thiserror::Error;

pub const ERR_INCORRECT_EMAIL_OR_PASSWORD: &str = "incorrect email or password";
pub const ERR_NOT_AUTHENTICATED: &str = "not authenticated";
pub const ERR_CONFIRM_PASSWORD_REQUIRED: &str = "confirm password is required";
pub const ERR_EASY_PASSWORD: &str = "password is easy to hack";

/// Errors returned by `UserRepository` implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No user matches the lookup key.
    #[error("record not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// A unique column (email, Telegram id) already holds this value.
    #[error("{0} already exists")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        StoreError::Validation(validation_message(&errors))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by a `SessionManager`.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The request carries no usable session.
    #[error("not authenticated")]
    Unauthenticated,

    #[error("session store error: {message}")]
    Store { message: String },
}

impl SessionError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

/// Error surfaced to HTTP clients as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be decoded.
    #[error("{message}")]
    Decode { message: String },

    #[error("{message}")]
    Validation { message: String },

    /// The request was well formed but the user could not be created.
    #[error("{message}")]
    Unprocessable { message: String },

    #[error("{message}")]
    Unauthenticated { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::Unprocessable {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::unauthenticated(ERR_NOT_AUTHENTICATED)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Unauthenticated => ApiError::not_authenticated(),
            other => ApiError::internal(other.to_string()),
        }
    }
}
