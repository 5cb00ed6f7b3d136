use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::Expr,
    sea_query::OnConflict, sea_query::SimpleExpr,
};
use tracing::info;

use crate::entities::{global_config, prelude::*};
use crate::models::settings::{GLOBAL_SETTINGS_ID, GlobalSettings, SettingsUpdate};

/// Outcome of a settings replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced { version: i64 },
    VersionMismatch,
}

/// Repository for the singleton settings row
pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: global_config::Model) -> GlobalSettings {
        GlobalSettings {
            api_keys: serde_json::from_str(&model.api_keys).unwrap_or_default(),
            current_key_index: model.current_key_index,
            maintenance_mode: model.maintenance_mode,
            image_gen_enabled: model.image_gen_enabled,
            quotes: serde_json::from_str(&model.quotes).unwrap_or_default(),
            custom_persona: model.custom_persona,
            version: model.version,
            updated_at: model.updated_at,
        }
    }

    /// Insert the default row unless one exists. Safe to call concurrently.
    pub async fn ensure_exists(&self) -> Result<()> {
        let active_model = global_config::ActiveModel {
            id: Set(GLOBAL_SETTINGS_ID.to_string()),
            api_keys: Set("[]".to_string()),
            current_key_index: Set(0),
            maintenance_mode: Set(false),
            image_gen_enabled: Set(true),
            quotes: Set("[]".to_string()),
            custom_persona: Set(None),
            version: Set(0),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let inserted = GlobalConfig::insert(active_model)
            .on_conflict(
                OnConflict::column(global_config::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to initialize global settings")?;

        if inserted > 0 {
            info!("Global settings initialized");
        }

        Ok(())
    }

    pub async fn get(&self) -> Result<GlobalSettings> {
        let model = GlobalConfig::find_by_id(GLOBAL_SETTINGS_ID.to_string())
            .one(&self.conn)
            .await
            .context("Failed to load global settings")?
            .ok_or_else(|| anyhow::anyhow!("Global settings row is missing"))?;

        Ok(Self::map_model(model))
    }

    /// Replace every admin-editable field in one statement.
    ///
    /// With `expected_version` the write is conditional on the stored version,
    /// otherwise the last writer wins.
    pub async fn replace(&self, update: &SettingsUpdate) -> Result<ReplaceOutcome> {
        let api_keys = serde_json::to_string(&update.api_keys)?;
        let quotes = serde_json::to_string(&update.quotes)?;
        let key_count = i32::try_from(update.api_keys.len()).unwrap_or(i32::MAX);

        let cursor = Expr::case(
            Expr::col(global_config::Column::CurrentKeyIndex).lt(key_count),
            Expr::col(global_config::Column::CurrentKeyIndex),
        )
        .finally(0);

        let mut query = GlobalConfig::update_many()
            .col_expr(global_config::Column::ApiKeys, Expr::value(api_keys))
            .col_expr(global_config::Column::CurrentKeyIndex, Into::<SimpleExpr>::into(cursor))
            .col_expr(
                global_config::Column::MaintenanceMode,
                Expr::value(update.maintenance_mode),
            )
            .col_expr(
                global_config::Column::ImageGenEnabled,
                Expr::value(update.image_gen_enabled),
            )
            .col_expr(global_config::Column::Quotes, Expr::value(quotes))
            .col_expr(
                global_config::Column::CustomPersona,
                Expr::value(update.custom_persona.clone()),
            )
            .col_expr(
                global_config::Column::Version,
                Expr::col(global_config::Column::Version).add(1),
            )
            .col_expr(
                global_config::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(global_config::Column::Id.eq(GLOBAL_SETTINGS_ID));

        if let Some(expected) = update.expected_version {
            query = query.filter(global_config::Column::Version.eq(expected));
        }

        let result = query
            .exec(&self.conn)
            .await
            .context("Failed to update global settings")?;

        if result.rows_affected == 0 {
            if update.expected_version.is_some() {
                return Ok(ReplaceOutcome::VersionMismatch);
            }
            anyhow::bail!("Global settings row is missing");
        }

        let version = self.get().await?.version;
        Ok(ReplaceOutcome::Replaced { version })
    }

    /// Persist the rotation cursor without touching anything else.
    pub async fn set_key_index(&self, index: i32) -> Result<()> {
        GlobalConfig::update_many()
            .col_expr(global_config::Column::CurrentKeyIndex, Expr::value(index))
            .filter(global_config::Column::Id.eq(GLOBAL_SETTINGS_ID))
            .exec(&self.conn)
            .await
            .context("Failed to store credential cursor")?;
        Ok(())
    }
}
