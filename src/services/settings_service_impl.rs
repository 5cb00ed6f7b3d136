//! `SeaORM` implementation of the `SettingsService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{ReplaceOutcome, Store};
use crate::models::settings::{Quote, SettingsUpdate};
use crate::services::settings_service::{AdminData, SettingsError, SettingsService};

pub struct SeaOrmSettingsService {
    store: Store,
}

impl SeaOrmSettingsService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsService for SeaOrmSettingsService {
    async fn admin_data(&self) -> Result<AdminData, SettingsError> {
        let users = self.store.list_non_admin_identities().await?;
        let settings = self.store.get_settings().await?;
        Ok(AdminData { users, settings })
    }

    async fn update(&self, update: SettingsUpdate) -> Result<i64, SettingsError> {
        match self.store.replace_settings(&update).await? {
            ReplaceOutcome::Replaced { version } => {
                info!(
                    version,
                    maintenance_mode = update.maintenance_mode,
                    api_keys = update.api_keys.len(),
                    quotes = update.quotes.len(),
                    "Global settings replaced"
                );
                Ok(version)
            }
            ReplaceOutcome::VersionMismatch => Err(SettingsError::Conflict {
                expected: update.expected_version.unwrap_or_default(),
            }),
        }
    }

    async fn quotes(&self) -> Result<Vec<Quote>, SettingsError> {
        Ok(self.store.get_settings().await?.quotes)
    }
}
