use serde::{Deserialize, Serialize};

/// Primary key of the singleton settings row.
pub const GLOBAL_SETTINGS_ID: &str = "global";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

/// The shared settings record controlling feature flags, persona and quotes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub api_keys: Vec<String>,
    pub current_key_index: i32,
    pub maintenance_mode: bool,
    pub image_gen_enabled: bool,
    pub quotes: Vec<Quote>,
    pub custom_persona: Option<String>,
    pub version: i64,
    pub updated_at: String,
}

/// Replacement values supplied by an admin. Every field is written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default)]
    pub image_gen_enabled: bool,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub custom_persona: Option<String>,
    /// When set, the replace only succeeds against this stored version.
    #[serde(default)]
    pub expected_version: Option<i64>,
}
