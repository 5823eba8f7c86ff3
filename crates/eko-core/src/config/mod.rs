mod defaults;
mod providers;


pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EkoError;
use defaults::*;

/// Top-level Eko configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub eko: EkoConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EkoConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for the daily rolling log file. Empty = stdout only.
    #[serde(default)]
    pub log_dir: String,
}

impl Default for EkoConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Bearer token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Must be set before serving.
    #[serde(default)]
    pub token_key: String,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    /// Profile image assigned to new and deleted accounts.
    #[serde(default = "default_image")]
    pub default_image: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_key: String::new(),
            token_ttl_days: default_token_ttl_days(),
            default_image: default_image(),
        }
    }
}

/// Storage config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Past messages sent to the completion provider with each new one.
    #[serde(default = "default_max_context")]
    pub max_context_messages: usize,
    #[serde(default = "default_saved_chats_limit")]
    pub saved_chats_limit: i64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_context_messages: default_max_context(),
            saved_chats_limit: default_saved_chats_limit(),
        }
    }
}

/// Locale catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Directory holding one `<code>.json` per language. Falls back to the
    /// bundled catalogs when it does not exist.
    #[serde(default = "default_locales_dir")]
    pub locales_dir: String,
    #[serde(default = "default_language")]
    pub default_language: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locales_dir: default_locales_dir(),
            default_language: default_language(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

impl Config {
    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TOKEN_KEY") {
            self.auth.token_key = v;
        }
        if let Some(v) = get("EKO_DB_PATH") {
            self.memory.db_path = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.provider
                .openai
                .get_or_insert_with(OpenAiConfig::default)
                .api_key = v;
        }

        let firebase_vars = [
            get("FIREBASE_API_KEY"),
            get("FIREBASE_PROJECT_ID"),
            get("FIREBASE_ACCESS_TOKEN"),
        ];
        if firebase_vars.iter().any(Option::is_some) {
            let fb = self
                .identity
                .firebase
                .get_or_insert_with(FirebaseConfig::default);
            let [api_key, project_id, access_token] = firebase_vars;
            if let Some(v) = api_key {
                fb.api_key = v;
            }
            if let Some(v) = project_id {
                fb.project_id = v;
            }
            if let Some(v) = access_token {
                fb.access_token = v;
            }
        }
    }
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, EkoError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EkoError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str::<Config>(&content)
            .map_err(|e| EkoError::Config(format!("failed to parse config: {}", e)))?
    } else {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    config.apply_env_overrides();
    Ok(config)
}
