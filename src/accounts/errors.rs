//! Account error types
//!
//! Every variant's `Display` text is the stable reason string returned to
//! callers inside a failed operation result.

use thiserror::Error;

/// Credential store failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint was violated on the named field
    #[error("unique constraint violated on {0}")]
    Conflict(&'static str),

    /// Connectivity, query or decoding failure in the backend
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let message = db_err.message();
                if message.contains("users.email") {
                    return Self::Conflict("email");
                }
                if message.contains("users.name") {
                    return Self::Conflict("name");
                }
            }
        }
        Self::Backend(err.to_string())
    }
}

/// Account operation error
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("email has already taken")]
    EmailTaken,

    #[error("fail to create account")]
    CreationFailed,

    #[error("could not find the email")]
    EmailNotFound,

    #[error("password is not correct")]
    PasswordIncorrect,

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid token")]
    InvalidToken,

    #[error("duplicate nickname")]
    DuplicateName,

    #[error("password should be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("password should be at most {0} bytes")]
    PasswordTooLong(usize),

    #[error("update failed")]
    UpdateFailed,

    #[error("search name needs at least {0} characters")]
    QueryTooShort(usize),

    #[error("could not find this user id {0}")]
    NotFound(i64),

    #[error("internal store error")]
    Store(#[from] StoreError),

    #[error("internal error")]
    Internal(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AccountError {
    /// Machine readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmailTaken => "email_taken",
            Self::CreationFailed => "creation_failed",
            Self::EmailNotFound => "email_not_found",
            Self::PasswordIncorrect => "password_incorrect",
            Self::Unauthorized | Self::InvalidToken => "unauthorized",
            Self::DuplicateName => "duplicate_name",
            Self::PasswordTooShort(_) => "password_too_short",
            Self::PasswordTooLong(_) => "password_too_long",
            Self::UpdateFailed => "update_failed",
            Self::QueryTooShort(_) => "query_too_short",
            Self::NotFound(_) => "not_found",
            Self::Store(_) => "storage_error",
            Self::Internal(_) => "server_error",
            Self::InvalidInput(_) => "invalid_input",
        }
    }

    /// Lower-layer failures that are logged before being flattened
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Internal(_))
    }
}
