//! Domain service for identities and their approval.
//!
//! Handles registration, login with token issuance, admin approval and the
//! bootstrap admin seed.

use serde::Serialize;
use thiserror::Error;

use crate::models::identity::{DisplayNames, Identity};
use crate::services::token::{Claims, TokenError};

/// Errors specific to identity operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username '{0}' already exists")]
    DuplicateIdentity(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity {0} not found")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(msg) => Self::InvalidToken(msg),
            TokenError::Signing(msg) => Self::Internal(msg),
        }
    }
}

/// Registration request as received from a client.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub ai_name: Option<String>,
    pub dev_name: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub identity: Identity,
    pub names: DisplayNames,
}

/// Domain service trait for identities.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an unapproved identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateIdentity`] if the username is taken.
    async fn register(&self, registration: Registration) -> Result<Identity, AuthError>;

    /// Verifies credentials and issues a token with the effective display names.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Sets the approval flag of an identity. Tokens already issued are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] if no identity has this id.
    async fn approve(&self, identity_id: i32, approve: bool) -> Result<(), AuthError>;

    /// Provisions the configured bootstrap admin if it does not exist yet.
    /// Returns `true` when an identity was created.
    async fn seed_admin(&self) -> Result<bool, AuthError>;

    /// Decodes and validates a bearer token.
    fn verify_token(&self, token: &str) -> Result<Claims, AuthError>;
}
