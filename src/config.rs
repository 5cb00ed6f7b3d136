use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Signing secret shipped in the default config. Startup warns when it is still in use.
pub const DEFAULT_JWT_SECRET: &str = "devcore-change-me-jwt-secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,

    /// HMAC secret used to sign login tokens.
    pub jwt_secret: String,

    /// Lifetime of issued tokens. The default is deliberately long (20 000 hours).
    pub token_ttl_hours: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: 20_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Registering with exactly this username/password pair yields an admin identity.
    pub admin_username: String,

    pub admin_password: String,

    /// Provision the admin identity at startup instead of waiting for it to register.
    pub seed_on_startup: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_username: "dap".to_string(),
            admin_password: "123".to_string(),
            seed_on_startup: false,
        }
    }
}

impl BootstrapConfig {
    #[must_use]
    pub fn grants_admin(&self, username: &str, password: &str) -> bool {
        !self.admin_username.is_empty()
            && username == self.admin_username
            && password == self.admin_password
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyProvider {
    /// Canned replies, no network access.
    Mock,
    /// OpenAI-compatible chat completion endpoint using the stored credentials.
    Upstream,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub provider: ReplyProvider,

    /// Base URL of the chat completion API, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    pub model: String,

    pub request_timeout_seconds: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: ReplyProvider::Mock,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "devcore".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human readable format
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/devcore.db".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            bootstrap: BootstrapConfig::default(),
            assistant: AssistantConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("devcore").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".devcore").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.security.jwt_secret.is_empty() {
            anyhow::bail!("security.jwt_secret cannot be empty");
        }

        if self.security.token_ttl_hours == 0 {
            anyhow::bail!("security.token_ttl_hours must be > 0");
        }

        if self.assistant.provider == ReplyProvider::Upstream && self.assistant.base_url.is_empty()
        {
            anyhow::bail!("assistant.base_url cannot be empty when the upstream provider is used");
        }

        Ok(())
    }

    /// Settings that are accepted but unsafe. Logged once tracing is up.
    #[must_use]
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();

        if self.security.jwt_secret == DEFAULT_JWT_SECRET {
            warnings.push("security.jwt_secret is still the default value; set a private secret");
        }

        warnings
    }
}
