use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Completion provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub openai: Option<OpenAiConfig>,
}

/// OpenAI-compatible completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Token cap for companion replies.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Token cap for generated chat names.
    #[serde(default = "default_name_max_tokens")]
    pub name_max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            name_max_tokens: default_name_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Identity provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub firebase: Option<FirebaseConfig>,
}

/// Firebase Identity Toolkit.
///
/// `api_key` covers signup, sign-in and password reset. Account updates,
/// lookups and deletes go through the project-scoped admin endpoints and
/// need an OAuth `access_token` for a service account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_firebase_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            access_token: String::new(),
            base_url: default_firebase_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FirebaseConfig {
    /// Whether the client-facing endpoints can be called.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Whether the admin endpoints can be called.
    pub fn has_admin_access(&self) -> bool {
        !self.project_id.trim().is_empty() && !self.access_token.trim().is_empty()
    }
}
