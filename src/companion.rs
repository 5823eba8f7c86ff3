//! Completion-backed helpers: chat titles and bot replies.
//!
//! Both degrade instead of failing: a missing or failing provider yields a
//! dated fallback title, or no reply at all.

use chrono::{DateTime, Datelike, Utc};
use eko_core::{
    config::OpenAiConfig,
    context::Context,
    i18n::Catalog,
    language::Language,
    models::ChatMessage,
    prompts::{chat_name_prompt, chat_name_system_prompt, clean_chat_name, companion_system_prompt},
    traits::CompletionProvider,
};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Companion {
    provider: Option<Arc<dyn CompletionProvider>>,
    name_max_tokens: u32,
    temperature: f32,
}

impl Companion {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>, config: &OpenAiConfig) -> Self {
        Self {
            provider,
            name_max_tokens: config.name_max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }

    /// Generate a short title for a new chat.
    pub async fn chat_name(&self, catalog: &Catalog, language: Language) -> String {
        let Some(provider) = &self.provider else {
            return fallback_chat_name(catalog, language, Utc::now());
        };

        let context = Context::new(chat_name_system_prompt(), chat_name_prompt(language))
            .with_max_tokens(self.name_max_tokens)
            .with_temperature(self.temperature);

        match provider.complete(&context).await {
            Ok(completion) => match clean_chat_name(&completion.text) {
                Some(name) => {
                    debug!("generated chat name '{name}'");
                    name
                }
                None => fallback_chat_name(catalog, language, Utc::now()),
            },
            Err(e) => {
                warn!("chat name generation failed: {e}");
                fallback_chat_name(catalog, language, Utc::now())
            }
        }
    }

    /// Reply to `message` given the prior conversation (oldest first).
    pub async fn reply(
        &self,
        language: Language,
        history: &[ChatMessage],
        message: &str,
    ) -> Option<String> {
        let provider = self.provider.as_ref()?;
        let context =
            Context::new(companion_system_prompt(language), message).with_history(history);

        match provider.complete(&context).await {
            Ok(completion) => {
                let text = completion.text.trim();
                if text.is_empty() {
                    warn!("{} returned an empty reply", provider.name());
                    return None;
                }
                debug!(
                    "reply from {} in {}ms",
                    provider.name(),
                    completion.processing_time_ms
                );
                Some(text.to_string())
            }
            Err(e) => {
                warn!("bot reply failed: {e}");
                None
            }
        }
    }
}

/// Localized `Chat - <date>` title, with the month name and day order
/// taken from the catalog.
pub fn fallback_chat_name(catalog: &Catalog, language: Language, at: DateTime<Utc>) -> String {
    let locale = language.locale_code();
    let month = catalog.get(locale, &format!("chat.months.{}", at.month()));
    let day = at.format("%d").to_string();
    let date = catalog.get_with(
        locale,
        "chat.short_date",
        &[("month", &month), ("day", &day)],
    );
    catalog.get_with(locale, "chat.default_name", &[("date", &date)])
}
