//! `SeaORM` implementation of the `ChatService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::Store;
use crate::models::turn::{NewTurn, Role, Turn};
use crate::services::chat_service::{ChatError, ChatMessage, ChatReply, ChatService};
use crate::services::persona::{self, MAINTENANCE_NOTICE};
use crate::services::reply::{ReplyGenerator, ReplyRequest};

pub struct SeaOrmChatService {
    store: Store,
    generator: Arc<dyn ReplyGenerator>,
}

impl SeaOrmChatService {
    #[must_use]
    pub fn new(store: Store, generator: Arc<dyn ReplyGenerator>) -> Self {
        Self { store, generator }
    }
}

#[async_trait]
impl ChatService for SeaOrmChatService {
    async fn chat(&self, message: ChatMessage) -> Result<ChatReply, ChatError> {
        self.store
            .append_turn(NewTurn::user(message.identity_id, message.message.clone()))
            .await?;

        let settings = self.store.get_settings().await?;

        if settings.maintenance_mode {
            metrics::counter!("chat_replies_total", "outcome" => "maintenance").increment(1);
            info!(identity_id = message.identity_id, "Chat refused, maintenance mode");
            return Ok(ChatReply {
                reply: MAINTENANCE_NOTICE.to_string(),
                is_code: false,
            });
        }

        let system_prompt =
            persona::build_system_prompt(settings.custom_persona.as_deref(), &message.names);

        let reply = self
            .generator
            .generate(&ReplyRequest {
                system_prompt: &system_prompt,
                message: &message.message,
                names: &message.names,
            })
            .await?;

        let (is_code, language) = persona::detect_code(&reply);

        self.store
            .append_turn(NewTurn {
                identity_id: message.identity_id,
                role: Role::Assistant,
                content: reply.clone(),
                is_code,
                code_language: Some(language.to_string()),
            })
            .await?;

        let outcome = if is_code { "code" } else { "text" };
        metrics::counter!("chat_replies_total", "outcome" => outcome).increment(1);
        debug!(identity_id = message.identity_id, is_code, "Chat reply stored");

        Ok(ChatReply { reply, is_code })
    }

    async fn history(&self, identity_id: i32) -> Result<Vec<Turn>, ChatError> {
        Ok(self.store.get_history(identity_id).await?)
    }
}
