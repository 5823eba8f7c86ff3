//! OpenAI-compatible completion provider.
//!
//! Works with OpenAI's API and any compatible endpoint.

use async_trait::async_trait;
use eko_core::{
    config::OpenAiConfig,
    context::{ApiMessage, Context},
    error::EkoError,
    traits::{Completion, CompletionProvider},
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    /// Create from config values. Requests time out after `timeout_secs`.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self, EkoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EkoError::Provider(format!("openai: failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ApiMessage>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: Option<u64>,
}

impl ChatCompletionResponse {
    fn first_text(&self) -> Option<&str> {
        self.choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.as_str())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }


    async fn complete(&self, context: &Context) -> Result<Completion, EkoError> {
        let effective_model = context.model.as_deref().unwrap_or(&self.model);
        let start = Instant::now();

        let body = ChatCompletionRequest {
            model: effective_model,
            messages: context.to_api_messages(),
            max_tokens: context.max_tokens.unwrap_or(self.max_tokens),
            temperature: context.temperature.unwrap_or(self.temperature),
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("openai: POST {url} model={effective_model}");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EkoError::Provider(format!("openai request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EkoError::Provider(format!(
                "openai returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| EkoError::Provider(format!("openai: failed to parse response: {e}")))?;

        let text = parsed
            .first_text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| EkoError::Provider("openai: response had no choices".to_string()))?;

        Ok(Completion {
            text,
            model: parsed.model,
            tokens_used: parsed.usage.as_ref().and_then(|u| u.total_tokens),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("openai: no API key configured");
            return false;
        }
        // Basic check: try to list models.
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("openai not available: {e}");
                false
            }
        }
    }
}
