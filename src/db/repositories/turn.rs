use anyhow::{Context, Result};
use chrono::SecondsFormat;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::{prelude::*, turns};
use crate::models::turn::{NewTurn, Turn};

/// Repository for the append-only chat turn log
pub struct TurnRepository {
    conn: DatabaseConnection,
}

impl TurnRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_turn_model(model: turns::Model) -> Result<Turn> {
        Ok(Turn {
            id: model.id,
            user_id: model.identity_id,
            role: model.role.parse()?,
            content: model.content,
            is_code: model.is_code,
            code_language: model.code_language,
            timestamp: model.timestamp,
        })
    }

    pub async fn append(&self, turn: NewTurn) -> Result<Turn> {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);

        let active_model = turns::ActiveModel {
            identity_id: Set(turn.identity_id),
            role: Set(turn.role.as_str().to_string()),
            content: Set(turn.content.clone()),
            is_code: Set(turn.is_code),
            code_language: Set(turn.code_language.clone()),
            timestamp: Set(timestamp.clone()),
            ..Default::default()
        };

        let res = Turns::insert(active_model)
            .exec(&self.conn)
            .await
            .context("Failed to persist chat turn")?;

        Ok(Turn {
            id: res.last_insert_id,
            user_id: turn.identity_id,
            role: turn.role,
            content: turn.content,
            is_code: turn.is_code,
            code_language: turn.code_language,
            timestamp,
        })
    }

    /// Every turn of one identity, oldest first.
    pub async fn list_for_identity(&self, identity_id: i32) -> Result<Vec<Turn>> {
        let rows = Turns::find()
            .filter(turns::Column::IdentityId.eq(identity_id))
            .order_by_asc(turns::Column::Timestamp)
            .order_by_asc(turns::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query chat history")?;

        rows.into_iter().map(Self::map_turn_model).collect()
    }
}
