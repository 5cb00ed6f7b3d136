//! Signed login tokens.
//!
//! Tokens are HS256 JWTs carrying the identity and the display names that were
//! effective when the token was issued.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::models::identity::{DisplayNames, Identity};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Identity id
    pub sub: i32,
    pub username: String,
    pub is_admin: bool,
    pub ai_name: String,
    pub dev_name: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    #[must_use]
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            &security.jwt_secret,
            Duration::from_secs(security.token_ttl_hours.saturating_mul(3600)),
        )
    }

    pub fn issue(&self, identity: &Identity, names: &DisplayNames) -> Result<String, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TokenError::Signing(e.to_string()))?
            .as_secs();

        let claims = Claims {
            sub: identity.id,
            username: identity.username.clone(),
            is_admin: identity.is_admin,
            ai_name: names.ai_name.clone(),
            dev_name: names.dev_name.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}
