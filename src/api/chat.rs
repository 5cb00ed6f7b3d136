use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::models::identity::DisplayNames;
use crate::models::turn::Turn;
use crate::services::chat_service::{ChatError, ChatMessage, ChatReply};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub user_id: i32,
    #[serde(default)]
    pub ai_name: Option<String>,
    #[serde(default)]
    pub dev_name: Option<String>,
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Database(msg) => Self::DatabaseError(msg),
            ChatError::Reply(msg) => Self::upstream(msg),
        }
    }
}

/// POST /chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let defaults = DisplayNames::default();
    let names = DisplayNames {
        ai_name: payload.ai_name.unwrap_or(defaults.ai_name),
        dev_name: payload.dev_name.unwrap_or(defaults.dev_name),
    };

    let reply = state
        .chat_service()
        .chat(ChatMessage {
            identity_id: payload.user_id,
            message: payload.message,
            names,
        })
        .await?;

    Ok(Json(reply))
}

/// GET /history/{user_id}
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Turn>>, ApiError> {
    let turns = state.chat_service().history(user_id).await?;
    Ok(Json(turns))
}
