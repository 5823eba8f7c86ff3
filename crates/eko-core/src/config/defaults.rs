//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Eko".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_api_port() -> u16 {
    8000
}

pub fn default_max_body_bytes() -> usize {
    1024 * 1024
}

pub fn default_token_ttl_days() -> i64 {
    30
}

pub fn default_image() -> String {
    "https://sauced-app-bucket.s3.us-east-2.amazonaws.com/sauced_placeholder.webp".to_string()
}

pub fn default_db_path() -> String {
    "~/.eko/data/eko.db".to_string()
}

pub fn default_max_context() -> usize {
    10
}

pub fn default_saved_chats_limit() -> i64 {
    100
}

pub fn default_locales_dir() -> String {
    "locales".to_string()
}

pub fn default_language() -> String {
    "en".to_string()
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

pub fn default_max_tokens() -> u32 {
    500
}

pub fn default_name_max_tokens() -> u32 {
    20
}

pub fn default_temperature() -> f32 {
    0.7
}

pub fn default_timeout_secs() -> u64 {
    10
}

pub fn default_firebase_base_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}
