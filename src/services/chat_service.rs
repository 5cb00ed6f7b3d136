//! Domain service for chat exchanges and history.

use serde::Serialize;
use thiserror::Error;

use crate::models::identity::DisplayNames;
use crate::models::turn::Turn;
use crate::services::reply::ReplyError;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Reply generation failed: {0}")]
    Reply(String),
}

impl From<sea_orm::DbErr> for ChatError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<ReplyError> for ChatError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::Database(msg) => Self::Database(msg),
            other => Self::Reply(other.to_string()),
        }
    }
}

/// One incoming chat message.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub identity_id: i32,
    pub message: String,
    pub names: DisplayNames,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub is_code: bool,
}

#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    /// Persists the message, answers it and persists the answer.
    ///
    /// While maintenance mode is on the answer is a fixed notice and only the
    /// user turn is stored.
    async fn chat(&self, message: ChatMessage) -> Result<ChatReply, ChatError>;

    /// Every turn of an identity in chronological order.
    async fn history(&self, identity_id: i32) -> Result<Vec<Turn>, ChatError>;
}
