//! Domain service for the global settings record and the public quotes feed.

use serde::Serialize;
use thiserror::Error;

use crate::models::identity::Identity;
use crate::models::settings::{GlobalSettings, Quote, SettingsUpdate};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings were changed concurrently (expected version {expected})")]
    Conflict { expected: i64 },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for SettingsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SettingsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Everything the admin console shows.
#[derive(Debug, Clone, Serialize)]
pub struct AdminData {
    pub users: Vec<Identity>,
    pub settings: GlobalSettings,
}

#[async_trait::async_trait]
pub trait SettingsService: Send + Sync {
    /// Non-admin identities plus the settings record.
    async fn admin_data(&self) -> Result<AdminData, SettingsError>;

    /// Replaces the editable settings wholesale and returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Conflict`] if `expected_version` is stale.
    async fn update(&self, update: SettingsUpdate) -> Result<i64, SettingsError>;

    async fn quotes(&self) -> Result<Vec<Quote>, SettingsError>;
}
