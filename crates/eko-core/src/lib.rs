//! # eko-core
//!
//! Core types, traits, configuration, localization, and error handling for
//! the Eko backend.

pub mod config;
pub mod context;
pub mod error;
pub mod i18n;
pub mod language;
pub mod models;
pub mod prompts;
pub mod traits;

pub use config::shellexpand;
