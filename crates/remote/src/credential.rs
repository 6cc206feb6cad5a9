//! Short-lived bearer tokens for the try-on service.
//!
//! Tokens are HS256-signed JWTs carrying only `iss`, `exp`, and `nbf`.
//! They are minted fresh for every outbound call and never cached, so a
//! long poll loop cannot outlive its credential.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Token lifetime in seconds from the moment of signing.
pub const TOKEN_LIFETIME_SECS: i64 = 1800;
/// How far in the past the token becomes valid, to absorb clock skew.
pub const CLOCK_SKEW_SECS: i64 = 5;

/// JWT claims sent to the try-on service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer -- the access key.
    pub iss: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Not-before time (UTC Unix timestamp).
    pub nbf: i64,
}

/// Errors raised while minting a token. All of them are configuration
/// problems and are never retried.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("access key is not configured")]
    MissingAccessKey,

    #[error("secret key is not configured")]
    MissingSecretKey,

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Access key / secret key pair for the try-on service.
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Sign a token valid from now - 5 s until now + 1800 s.
    pub fn issue_token(&self) -> Result<String, CredentialError> {
        self.issue_token_at(chrono::Utc::now().timestamp())
    }

    /// Sign a token relative to the given Unix timestamp.
    pub fn issue_token_at(&self, now: i64) -> Result<String, CredentialError> {
        if self.access_key.is_empty() {
            return Err(CredentialError::MissingAccessKey);
        }
        if self.secret_key.is_empty() {
            return Err(CredentialError::MissingSecretKey);
        }

        let claims = Claims {
            iss: self.access_key.clone(),
            exp: now + TOKEN_LIFETIME_SECS,
            nbf: now - CLOCK_SKEW_SECS,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_key.as_bytes()),
        )?)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
