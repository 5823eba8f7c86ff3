//! Localized user-facing messages.
//!
//! A [`Catalog`] holds one nested message tree per language code, loaded once
//! at startup and shared read-only afterwards. Lookups address leaves with a
//! dotted key path (`"auth.login.success"`) and never fail:
//!
//! 1. an unknown language is replaced by the default language,
//! 2. a key missing from the chosen language is retried in the default one,
//! 3. a key missing everywhere comes back as the key path itself,
//! 4. a template whose placeholders cannot be filled comes back un-interpolated.

mod format;


pub use format::interpolate;

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{shellexpand, I18nConfig};
use crate::error::EkoError;

/// One node of a language's message tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Group(HashMap<String, Node>),
}

/// All loaded languages plus the fallback language.
#[derive(Debug, Clone)]
pub struct Catalog {
    locales: HashMap<String, Node>,
    default_language: String,
}

const BUNDLED: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("fr", include_str!("../../locales/fr.json")),
];

impl Catalog {
    /// An empty catalog. Every lookup returns the key path until languages
    /// are inserted.
    pub fn new(default_language: &str) -> Self {
        Self {
            locales: HashMap::new(),
            default_language: default_language.to_string(),
        }
    }

    /// Add (or replace) one language's message tree.
    pub fn insert(&mut self, language: &str, tree: Node) {
        self.locales.insert(language.to_string(), tree);
    }

    /// Parse a JSON document and add it as `language`.
    pub fn insert_json(&mut self, language: &str, json: &str) -> Result<(), EkoError> {
        let tree: Node = serde_json::from_str(json)
            .map_err(|e| EkoError::Locale(format!("invalid catalog for '{language}': {e}")))?;
        if matches!(tree, Node::Text(_)) {
            return Err(EkoError::Locale(format!(
                "catalog for '{language}' must be a JSON object"
            )));
        }
        self.insert(language, tree);
        Ok(())
    }

    /// Catalogs compiled into the binary (English and French).
    pub fn bundled(default_language: &str) -> Result<Self, EkoError> {
        let mut catalog = Self::new(default_language);
        for (language, json) in BUNDLED {
            catalog.insert_json(language, json)?;
        }
        Ok(catalog)
    }

    /// Load every `*.json` file in `dir`; the file stem is the language code.
    pub fn load_dir(dir: &Path, default_language: &str) -> Result<Self, EkoError> {
        let mut catalog = Self::new(default_language);
        let entries = std::fs::read_dir(dir).map_err(|e| {
            EkoError::Locale(format!("failed to read {}: {e}", dir.display()))
        })?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = std::fs::read_to_string(&path)?;
            catalog.insert_json(language, &content)?;
        }

        if !catalog.has_language(default_language) {
            warn!(
                "locale directory {} has no catalog for default language '{default_language}'",
                dir.display()
            );
        }
        Ok(catalog)
    }

    /// Load from the configured directory, or the bundled catalogs when the
    /// directory does not exist.
    pub fn load(config: &I18nConfig) -> Result<Self, EkoError> {
        let dir = shellexpand(&config.locales_dir);
        let path = Path::new(&dir);
        let catalog = if path.is_dir() {
            Self::load_dir(path, &config.default_language)?
        } else {
            Self::bundled(&config.default_language)?
        };
        info!(
            "Loaded locales [{}] (default: {})",
            catalog.supported_languages().join(", "),
            catalog.default_language
        );
        Ok(catalog)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.locales.contains_key(language)
    }

    /// Loaded language codes, sorted.
    pub fn supported_languages(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.locales.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Resolve `key_path` in `language` without interpolation.
    pub fn get(&self, language: &str, key_path: &str) -> String {
        self.get_with(language, key_path, &[])
    }

    /// Resolve `key_path` in `language` and fill `{name}` placeholders.
    pub fn get_with(&self, language: &str, key_path: &str, params: &[(&str, &str)]) -> String {
        let language = if self.has_language(language) {
            language
        } else {
            self.default_language.as_str()
        };

        let template = self.lookup(language, key_path).or_else(|| {
            if language != self.default_language {
                self.lookup(&self.default_language, key_path)
            } else {
                None
            }
        });

        match template {
            None => key_path.to_string(),
            Some(t) if params.is_empty() => t.to_string(),
            Some(t) => interpolate(t, params).unwrap_or_else(|| t.to_string()),
        }
    }

    /// Bind a language for repeated lookups.
    pub fn localizer<'a>(&'a self, language: &'a str) -> Localizer<'a> {
        Localizer {
            catalog: self,
            language,
        }
    }

    fn lookup(&self, language: &str, key_path: &str) -> Option<&str> {
        let mut node = self.locales.get(language)?;
        for segment in key_path.split('.') {
            let next = match node {
                Node::Group(children) => children.get(segment)?,
                Node::Text(_) => return None,
            };
            node = next;
        }
        match node {
            Node::Text(text) => Some(text.as_str()),
            Node::Group(_) => None,
        }
    }
}

/// A catalog bound to one language.
#[derive(Clone, Copy)]
pub struct Localizer<'a> {
    catalog: &'a Catalog,
    language: &'a str,
}

impl<'a> Localizer<'a> {
    pub fn language(&self) -> &'a str {
        self.language
    }

    pub fn t(&self, key_path: &str) -> String {
        self.catalog.get(self.language, key_path)
    }

    pub fn t_with(&self, key_path: &str, params: &[(&str, &str)]) -> String {
        self.catalog.get_with(self.language, key_path, params)
    }
}
