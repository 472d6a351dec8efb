//! Bearer token validation for the adoption backend
//!
//! Tokens are RS256 JWTs issued by the identity provider. The service only
//! validates them; signing is only compiled for tests (`test-util` feature)
//! so that test suites can mint tokens with a matching key pair.
//!
//! ## Security Design
//!
//! - **RS256 ONLY**: No symmetric algorithms (HS256) to prevent confusion attacks
//! - **No hardcoded keys**: keys are passed in from configuration
//! - **Injected**: validators are constructed at startup and shared through app state

#[cfg(any(test, feature = "test-util"))]
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
#[cfg(any(test, feature = "test-util"))]
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT algorithm accepted by the service
const JWT_ALGORITHM: Algorithm = Algorithm::RS256;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("token validation failed: {0}")]
    Invalid(String),

    #[cfg(any(test, feature = "test-util"))]
    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("invalid subject: {0}")]
    InvalidSubject(String),
}

/// JWT claims carried by access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::InvalidSubject(e.to_string()))
    }
}

/// Validates RS256 tokens against a public key.
#[derive(Clone)]
pub struct JwtValidator {
    key: DecodingKey,
}

impl JwtValidator {
    pub fn from_public_key_pem(public_key_pem: &str) -> Result<Self, JwtError> {
        let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Failed to parse RSA public key: {e}")))?;
        Ok(Self { key })
    }

    /// Verify signature and expiry, returning the claims.
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.key, &validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::Invalid(e.to_string()))
    }

    /// Validate and extract the user id from `sub`.
    pub fn user_id(&self, token: &str) -> Result<Uuid, JwtError> {
        self.validate(token)?.user_id()
    }
}

/// Issues RS256 tokens from a private key.
#[cfg(any(test, feature = "test-util"))]
pub struct JwtSigner {
    key: EncodingKey,
}

#[cfg(any(test, feature = "test-util"))]
impl JwtSigner {
    pub fn from_private_key_pem(private_key_pem: &str) -> Result<Self, JwtError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Failed to parse RSA private key: {e}")))?;
        Ok(Self { key })
    }

    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            email: None,
            username: None,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }
}
