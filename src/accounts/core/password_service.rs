//! Password hashing service

use crate::accounts::{config::PasswordConfig, errors::AccountError};

/// bcrypt only reads the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// bcrypt hashing and verification
#[derive(Debug, Clone)]
pub struct PasswordService {
    config: PasswordConfig,
}

impl PasswordService {
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    /// Reject passwords shorter than the configured minimum or longer than
    /// bcrypt can hash
    pub fn validate_length(&self, password: &str) -> Result<(), AccountError> {
        if password.chars().count() < self.config.min_length {
            return Err(AccountError::PasswordTooShort(self.config.min_length));
        }
        check_max_length(password)
    }

    /// Hash a password with the configured cost
    pub fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        check_max_length(password)?;
        bcrypt::hash(password, self.config.bcrypt_cost)
            .map_err(|e| AccountError::Internal(format!("password hashing failed: {}", e)))
    }

    /// Constant-time verification. A malformed digest counts as a mismatch,
    /// as does a password too long to have been hashed.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

fn check_max_length(password: &str) -> Result<(), AccountError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AccountError::PasswordTooLong(MAX_PASSWORD_BYTES));
    }
    Ok(())
}
