use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            // older rows used "ai"
            "assistant" | "ai" => Ok(Self::Assistant),
            other => anyhow::bail!("Unknown turn role: {other}"),
        }
    }
}

/// One persisted chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: i64,
    pub user_id: i32,
    pub role: Role,
    pub content: String,
    pub is_code: bool,
    pub code_language: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct NewTurn {
    pub identity_id: i32,
    pub role: Role,
    pub content: String,
    pub is_code: bool,
    pub code_language: Option<String>,
}

impl NewTurn {
    #[must_use]
    pub fn user(identity_id: i32, content: impl Into<String>) -> Self {
        Self {
            identity_id,
            role: Role::User,
            content: content.into(),
            is_code: false,
            code_language: None,
        }
    }
}
