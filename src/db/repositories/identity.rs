use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{identities, prelude::*};
use crate::models::identity::{Identity, NewIdentity};

impl From<identities::Model> for Identity {
    fn from(model: identities::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            ai_name_request: model.ai_name_request,
            dev_name_request: model.dev_name_request,
            is_approved: model.is_approved,
            is_admin: model.is_admin,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct IdentityRepository {
    conn: DatabaseConnection,
}

impl IdentityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new identity, hashing its password.
    /// Uniqueness of the username is enforced by the table.
    pub async fn create(&self, new: NewIdentity, security: &SecurityConfig) -> Result<Identity> {
        let password = new.password;
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let active = identities::ActiveModel {
            username: Set(new.username),
            password_hash: Set(password_hash),
            ai_name_request: Set(new.ai_name_request),
            dev_name_request: Set(new.dev_name_request),
            is_approved: Set(new.is_approved),
            is_admin: Set(new.is_admin),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(Identity::from(model))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let identity = Identities::find()
            .filter(identities::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query identity by username")?;

        Ok(identity.map(Identity::from))
    }

    pub async fn exists(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    /// All identities without the admin flag, oldest first.
    pub async fn list_non_admin(&self) -> Result<Vec<Identity>> {
        let rows = Identities::find()
            .filter(identities::Column::IsAdmin.eq(false))
            .order_by_asc(identities::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list identities")?;

        Ok(rows.into_iter().map(Identity::from).collect())
    }

    /// Verify the password for a username and return the identity on success.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Identity>> {
        let identity = Identities::find()
            .filter(identities::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query identity for password verification")?;

        let Some(identity) = identity else {
            return Ok(None);
        };

        let password_hash = identity.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| Identity::from(identity)))
    }

    /// Set the approval flag. Returns `false` when no identity has this id.
    pub async fn set_approved(&self, id: i32, approved: bool) -> Result<bool> {
        let Some(identity) = Identities::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query identity for approval")?
        else {
            return Ok(false);
        };

        let mut active: identities::ActiveModel = identity.into();
        active.is_approved = Set(approved);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
