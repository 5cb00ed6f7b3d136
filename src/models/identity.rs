use serde::{Deserialize, Serialize};

/// Names shown to a user who has not been approved yet.
pub const DEFAULT_AI_NAME: &str = "DevCORE";
pub const DEFAULT_DEV_NAME: &str = "XdpzQ";

/// A registered account, without its password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub ai_name_request: Option<String>,
    pub dev_name_request: Option<String>,
    pub is_approved: bool,
    pub is_admin: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// The AI/developer name pair used for a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNames {
    pub ai_name: String,
    pub dev_name: String,
}

impl Default for DisplayNames {
    fn default() -> Self {
        Self {
            ai_name: DEFAULT_AI_NAME.to_string(),
            dev_name: DEFAULT_DEV_NAME.to_string(),
        }
    }
}

impl Identity {
    /// Requested names while approved, the default pair otherwise.
    #[must_use]
    pub fn effective_names(&self) -> DisplayNames {
        if !self.is_approved {
            return DisplayNames::default();
        }

        DisplayNames {
            ai_name: self.ai_name_request.clone().unwrap_or_default(),
            dev_name: self.dev_name_request.clone().unwrap_or_default(),
        }
    }
}

/// Fields captured at registration.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub password: String,
    pub ai_name_request: Option<String>,
    pub dev_name_request: Option<String>,
    pub is_admin: bool,
    pub is_approved: bool,
}
