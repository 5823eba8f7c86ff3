//! # eko-memory
//!
//! Persistent storage for Eko (SQLite-backed): user accounts, chats and
//! chat messages.

pub mod store;

pub use store::{ConversationPage, Store, StoreStats};
