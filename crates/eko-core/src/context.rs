use serde::{Deserialize, Serialize};

use crate::models::ChatMessage;

/// A single entry in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextEntry {
    /// "user" or "assistant".
    pub role: String,
    /// The message content.
    pub content: String,
}

impl From<&ChatMessage> for ContextEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.sender.completion_role().to_string(),
            content: message.text.clone(),
        }
    }
}

/// Conversation context passed to a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// System prompt prepended to every request.
    pub system_prompt: String,
    /// Conversation history (oldest first).
    pub history: Vec<ContextEntry>,
    /// The current user message.
    pub current_message: String,
    /// Override the provider's default model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Override the provider's default completion length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Override the provider's default sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A structured message for chat-completion APIs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiMessage {
    /// "system", "user" or "assistant".
    pub role: String,
    /// The message content.
    pub content: String,
}

impl Context {
    /// Create a context with a system prompt and the current message.
    pub fn new(system_prompt: &str, message: &str) -> Self {
        Self {
            system_prompt: system_prompt.to_string(),
            history: Vec::new(),
            current_message: message.to_string(),
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Attach stored messages (oldest first) as history.
    pub fn with_history<'a, I>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = &'a ChatMessage>,
    {
        self.history = messages.into_iter().map(ContextEntry::from).collect();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Convert context to structured API messages.
    ///
    /// The system prompt leads the list when non-empty, followed by the
    /// history and the current message.
    pub fn to_api_messages(&self) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);

        if !self.system_prompt.is_empty() {
            messages.push(ApiMessage {
                role: "system".to_string(),
                content: self.system_prompt.clone(),
            });
        }

        for entry in &self.history {
            messages.push(ApiMessage {
                role: entry.role.clone(),
                content: entry.content.clone(),
            });
        }

        messages.push(ApiMessage {
            role: "user".to_string(),
            content: self.current_message.clone(),
        });

        messages
    }
}
