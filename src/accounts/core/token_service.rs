//! Session token service

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::accounts::errors::AccountError;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_EXPIRY: u64 = 365 * 24 * 3600;

/// JWT claims
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User ID
    sub: String,
    /// Login email
    email: String,
    /// Expiry timestamp
    exp: usize,
    /// Issued-at timestamp
    iat: usize,
}

/// HS256 bearer token issuer
pub struct TokenService {
    secret: zeroize::Zeroizing<String>,

    /// Token lifetime (seconds)
    expiry: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service, rejecting weak secrets
    ///
    /// # Errors
    /// `InvalidInput` if the secret is shorter than 32 bytes or contains a
    /// well-known placeholder, or if `expiry` is zero or above
    /// [`MAX_TOKEN_EXPIRY`].
    pub fn new(secret: String, expiry: u64) -> Result<Self, AccountError> {
        if expiry == 0 || expiry > MAX_TOKEN_EXPIRY {
            return Err(AccountError::InvalidInput(format!(
                "token expiry must be between 1 and {} seconds, got {}",
                MAX_TOKEN_EXPIRY, expiry
            )));
        }

        if secret.len() < 32 {
            return Err(AccountError::InvalidInput(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        const WEAK_SECRETS: &[&str] = &["changeme", "change_in_production", "dev_secret", "12345678"];

        let lowered = secret.to_lowercase();
        if let Some(weak) = WEAK_SECRETS.iter().find(|weak| lowered.contains(*weak)) {
            return Err(AccountError::InvalidInput(format!(
                "Weak or common JWT secret detected: contains '{}'",
                weak
            )));
        }

        Ok(Self {
            secret: zeroize::Zeroizing::new(secret),
            expiry,
        })
    }

    /// Issue a token bound to `user_id`
    pub fn generate_token(&self, user_id: i64, email: &str) -> Result<String, AccountError> {
        self.generate_token_at(user_id, email, chrono::Utc::now().timestamp())
    }

    fn generate_token_at(
        &self,
        user_id: i64,
        email: &str,
        issued_at: i64,
    ) -> Result<String, AccountError> {
        let iat = issued_at.max(0);
        let exp = i64::try_from(self.expiry)
            .ok()
            .and_then(|expiry| iat.checked_add(expiry))
            .and_then(|exp| usize::try_from(exp).ok())
            .ok_or_else(|| AccountError::Internal("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp,
            iat: usize::try_from(iat)
                .map_err(|_| AccountError::Internal("issue time out of range".to_string()))?,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AccountError::Internal(format!("JWT generation failed: {}", e)))
    }

    /// Verify signature and expiry, returning the user id
    pub fn verify_token(&self, token: &str) -> Result<i64, AccountError> {
        let raw = token.trim();
        let raw = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

        let token_data = decode::<Claims>(
            raw,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            debug!("token rejected: {}", e);
            AccountError::InvalidToken
        })?;

        token_data
            .claims
            .sub
            .parse()
            .map_err(|_| AccountError::InvalidToken)
    }
}
