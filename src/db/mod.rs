use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::models::identity::{Identity, NewIdentity};
use crate::models::settings::{GlobalSettings, SettingsUpdate};
use crate::models::turn::{NewTurn, Turn};

pub mod migrator;
pub mod repositories;

pub use repositories::settings::ReplaceOutcome;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        let store = Self { conn };
        store.settings_repo().ensure_exists().await?;

        Ok(store)
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn identity_repo(&self) -> repositories::identity::IdentityRepository {
        repositories::identity::IdentityRepository::new(self.conn.clone())
    }

    fn turn_repo(&self) -> repositories::turn::TurnRepository {
        repositories::turn::TurnRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::SettingsRepository {
        repositories::settings::SettingsRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Identities
    // ========================================================================

    pub async fn create_identity(
        &self,
        new: NewIdentity,
        security: &SecurityConfig,
    ) -> Result<Identity> {
        self.identity_repo().create(new, security).await
    }

    pub async fn identity_exists(&self, username: &str) -> Result<bool> {
        self.identity_repo().exists(username).await
    }

    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Identity>> {
        self.identity_repo()
            .verify_credentials(username, password)
            .await
    }

    pub async fn list_non_admin_identities(&self) -> Result<Vec<Identity>> {
        self.identity_repo().list_non_admin().await
    }

    pub async fn set_identity_approved(&self, id: i32, approved: bool) -> Result<bool> {
        self.identity_repo().set_approved(id, approved).await
    }

    // ========================================================================
    // Turns
    // ========================================================================

    pub async fn append_turn(&self, turn: NewTurn) -> Result<Turn> {
        self.turn_repo().append(turn).await
    }

    pub async fn get_history(&self, identity_id: i32) -> Result<Vec<Turn>> {
        self.turn_repo().list_for_identity(identity_id).await
    }

    // ========================================================================
    // Global settings
    // ========================================================================

    pub async fn get_settings(&self) -> Result<GlobalSettings> {
        self.settings_repo().get().await
    }

    pub async fn replace_settings(&self, update: &SettingsUpdate) -> Result<ReplaceOutcome> {
        self.settings_repo().replace(update).await
    }

    pub async fn set_credential_cursor(&self, index: i32) -> Result<()> {
        self.settings_repo().set_key_index(index).await
    }
}
