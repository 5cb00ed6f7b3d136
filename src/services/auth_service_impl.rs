//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::{BootstrapConfig, SecurityConfig};
use crate::db::Store;
use crate::models::identity::{DEFAULT_AI_NAME, DEFAULT_DEV_NAME, Identity, NewIdentity};
use crate::services::auth_service::{AuthError, AuthService, LoginResult, Registration};
use crate::services::token::{Claims, TokenSigner};

pub struct SeaOrmAuthService {
    store: Store,
    signer: TokenSigner,
    security: SecurityConfig,
    bootstrap: BootstrapConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        signer: TokenSigner,
        security: SecurityConfig,
        bootstrap: BootstrapConfig,
    ) -> Self {
        Self {
            store,
            signer,
            security,
            bootstrap,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<Identity, AuthError> {
        if registration.username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if registration.password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        if self.store.identity_exists(&registration.username).await? {
            return Err(AuthError::DuplicateIdentity(registration.username));
        }

        let is_admin = self
            .bootstrap
            .grants_admin(&registration.username, &registration.password);

        let username = registration.username.clone();
        let new = NewIdentity {
            username: registration.username,
            password: registration.password,
            ai_name_request: registration.ai_name,
            dev_name_request: registration.dev_name,
            is_admin,
            is_approved: false,
        };

        match self.store.create_identity(new, &self.security).await {
            Ok(identity) => {
                info!(username = %identity.username, is_admin, "Identity registered");
                Ok(identity)
            }
            // Lost a race against a concurrent registration of the same name
            Err(_) if self.store.identity_exists(&username).await? => {
                Err(AuthError::DuplicateIdentity(username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let identity = self
            .store
            .verify_credentials(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let names = identity.effective_names();
        let token = self.signer.issue(&identity, &names)?;

        Ok(LoginResult {
            token,
            identity,
            names,
        })
    }

    async fn approve(&self, identity_id: i32, approve: bool) -> Result<(), AuthError> {
        let updated = self
            .store
            .set_identity_approved(identity_id, approve)
            .await?;

        if !updated {
            return Err(AuthError::NotFound(identity_id));
        }

        info!(identity_id, approve, "Identity approval changed");
        Ok(())
    }

    async fn seed_admin(&self) -> Result<bool, AuthError> {
        let username = &self.bootstrap.admin_username;
        if username.is_empty() {
            return Err(AuthError::Validation(
                "bootstrap.admin_username is empty".to_string(),
            ));
        }

        if self.store.identity_exists(username).await? {
            return Ok(false);
        }

        let new = NewIdentity {
            username: username.clone(),
            password: self.bootstrap.admin_password.clone(),
            ai_name_request: Some(DEFAULT_AI_NAME.to_string()),
            dev_name_request: Some(DEFAULT_DEV_NAME.to_string()),
            is_admin: true,
            is_approved: true,
        };
        self.store.create_identity(new, &self.security).await?;

        info!(username = %username, "Bootstrap admin provisioned");
        Ok(true)
    }

    fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(self.signer.verify(token)?)
    }
}
