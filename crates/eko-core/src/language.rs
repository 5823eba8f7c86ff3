//! Language values as stored, as sent by clients, and as locale codes.

use serde::{Deserialize, Serialize};

/// Stored user language (`"english"` / `"french"`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    /// Parse a stored value. Anything unrecognized is English.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("french") => Self::French,
            _ => Self::English,
        }
    }

    pub fn as_stored(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::French => "french",
        }
    }

    /// Locale code used for catalog lookups.
    pub fn locale_code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
        }
    }
}

/// Language as sent in request bodies (`"EN"` / `"FR"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageRequest {
    #[serde(rename = "EN")]
    En,
    #[serde(rename = "FR")]
    Fr,
}

impl LanguageRequest {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EN" => Some(Self::En),
            "FR" => Some(Self::Fr),
            _ => None,
        }
    }
}

impl From<LanguageRequest> for Language {
    fn from(value: LanguageRequest) -> Self {
        match value {
            LanguageRequest::En => Language::English,
            LanguageRequest::Fr => Language::French,
        }
    }
}

/// Supported locale codes for unauthenticated requests.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "fr"];

/// Locale code from an `Accept-Language` header value: the first two
/// characters, lowercased, if supported; `"en"` otherwise.
pub fn locale_from_accept_language(header: Option<&str>) -> &'static str {
    let prefix: String = header
        .unwrap_or_default()
        .trim()
        .chars()
        .take(2)
        .collect::<String>()
        .to_ascii_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|code| *code == prefix)
        .unwrap_or("en")
}
