//! Reply generation strategies.
//!
//! The chat flow only sees [`ReplyGenerator`]. The mock answers from canned
//! text; the upstream generator calls an OpenAI-compatible API and rotates
//! through the stored credentials when a call fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AssistantConfig;
use crate::db::Store;
use crate::models::identity::DisplayNames;

/// Messages containing any of these (case-insensitive) get the code reply.
pub const CODE_TRIGGER_KEYWORDS: [&str; 3] = ["script", "html", "python"];

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("No upstream credentials configured")]
    NoCredentials,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ReplyError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

pub struct ReplyRequest<'a> {
    pub system_prompt: &'a str,
    pub message: &'a str,
    pub names: &'a DisplayNames,
}

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, request: &ReplyRequest<'_>) -> Result<String, ReplyError>;
}

/// Canned replies keyed on a few trigger words.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockReplyGenerator;

impl MockReplyGenerator {
    #[must_use]
    pub fn wants_code(message: &str) -> bool {
        let lowered = message.to_lowercase();
        CODE_TRIGGER_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
    }

    #[must_use]
    pub fn reply_for(message: &str, names: &DisplayNames) -> String {
        if Self::wants_code(message) {
            format!(
                "Sure {dev}, here is the requested script:\n\n```html\n<h1>Generated by {ai}</h1>\n<p>System ready.</p>\n```\n\nUse it wisely.",
                dev = names.dev_name,
                ai = names.ai_name,
            )
        } else {
            format!(
                "[{ai}]: Command received. Processing \"{message}\"...",
                ai = names.ai_name,
            )
        }
    }
}

#[async_trait]
impl ReplyGenerator for MockReplyGenerator {
    async fn generate(&self, request: &ReplyRequest<'_>) -> Result<String, ReplyError> {
        Ok(Self::reply_for(request.message, request.names))
    }
}

/// Credential indices to try, starting at the cursor and wrapping once around.
#[must_use]
pub fn rotation_order(len: usize, cursor: i32) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let start = usize::try_from(cursor).unwrap_or(0) % len;
    (0..len).map(|offset| (start + offset) % len).collect()
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completion client with credential rotation.
pub struct UpstreamReplyGenerator {
    client: reqwest::Client,
    store: Store,
    base_url: String,
    model: String,
}

impl UpstreamReplyGenerator {
    pub fn new(store: Store, config: &AssistantConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("devcore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build upstream HTTP client: {e}"))?;

        Ok(Self {
            client,
            store,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    async fn call(&self, api_key: &str, request: &ReplyRequest<'_>) -> Result<String, ReplyError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.message,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReplyError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReplyError::Upstream(format!("HTTP {status}")));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ReplyError::Upstream(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ReplyError::Upstream("Empty completion".to_string()))
    }
}

#[async_trait]
impl ReplyGenerator for UpstreamReplyGenerator {
    async fn generate(&self, request: &ReplyRequest<'_>) -> Result<String, ReplyError> {
        let settings = self.store.get_settings().await?;
        let order = rotation_order(settings.api_keys.len(), settings.current_key_index);

        if order.is_empty() {
            return Err(ReplyError::NoCredentials);
        }

        let mut last_error = None;
        for index in order {
            match self.call(&settings.api_keys[index], request).await {
                Ok(reply) => {
                    let index = i32::try_from(index).unwrap_or(0);
                    if index != settings.current_key_index {
                        debug!(index, "Rotated upstream credential");
                        self.store.set_credential_cursor(index).await?;
                    }
                    return Ok(reply);
                }
                Err(e) => {
                    metrics::counter!("upstream_credential_failures_total").increment(1);
                    warn!(index, error = %e, "Upstream call failed, trying next credential");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ReplyError::NoCredentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> DisplayNames {
        DisplayNames {
            ai_name: "Ava".to_string(),
            dev_name: "Bob".to_string(),
        }
    }

    #[test]
    fn trigger_keywords_are_case_insensitive() {
        assert!(MockReplyGenerator::wants_code("write me a SCRIPT"));
        assert!(MockReplyGenerator::wants_code("Html page please"));
        assert!(MockReplyGenerator::wants_code("pythonic?"));
        assert!(!MockReplyGenerator::wants_code("hello there"));
    }

    #[test]
    fn code_reply_embeds_fence_and_names() {
        let reply = MockReplyGenerator::reply_for("a script", &names());
        assert!(reply.starts_with("Sure Bob"));
        assert!(reply.contains("```html\n<h1>Generated by Ava</h1>"));
        assert_eq!(reply.matches("```").count(), 2);
    }

    #[test]
    fn plain_reply_echoes_message() {
        let reply = MockReplyGenerator::reply_for("status report", &names());
        assert_eq!(
            reply,
            "[Ava]: Command received. Processing \"status report\"..."
        );
        assert!(!reply.contains("```"));
    }

    #[test]
    fn rotation_starts_at_cursor_and_wraps() {
        assert_eq!(rotation_order(3, 1), vec![1, 2, 0]);
        assert_eq!(rotation_order(3, 0), vec![0, 1, 2]);
        assert_eq!(rotation_order(2, 5), vec![1, 0]);
        assert_eq!(rotation_order(2, -1), vec![0, 1]);
        assert!(rotation_order(0, 0).is_empty());
    }
}
