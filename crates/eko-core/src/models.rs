//! Persistent entities: users, chats and chat messages.
//!
//! Field names on the wire keep the client contract (`_id`, `isDeleted`,
//! `short_description`, ...), hence the per-field renames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::Language;

/// Generate a new record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validate and normalize a client-supplied record id.
pub fn parse_id(raw: &str) -> Option<String> {
    Uuid::parse_str(raw.trim()).ok().map(|id| id.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Deleted,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Account kind. Brand accounts sign in through a separate panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    User,
    Brand,
}

impl UserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Brand => "brand",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "brand" => Some(Self::Brand),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    /// Identity-provider account id.
    pub uid: Option<String>,
    pub email: String,
    pub name: String,
    pub provider: String,
    pub status: UserStatus,
    /// True until the user finishes the second welcome step.
    pub welcome: bool,
    pub image: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
    #[serde(rename = "notificationToken")]
    pub notification_token: String,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub language: Option<Language>,
    pub purpose: Option<String>,
    pub profile_completed: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Stored language, English when unset.
    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }

    /// Locale code for catalog lookups.
    pub fn locale(&self) -> &'static str {
        self.language().locale_code()
    }
}

/// Fields supplied when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: Option<String>,
    pub email: String,
    pub provider: String,
    pub image: String,
    pub kind: UserKind,
}

/// Onboarding answers.
#[derive(Debug, Clone)]
pub struct Onboarding {
    pub name: String,
    pub age: i64,
    pub gender: Option<String>,
    pub language: Language,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Active,
    Archived,
    Deleted,
}

impl ChatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chat {
    #[serde(rename = "chatId")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub title: String,
    pub short_description: String,
    pub is_temporary: bool,
    pub status: ChatStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "lastMessageAt")]
    pub last_message_at: DateTime<Utc>,
    #[serde(rename = "messageCount")]
    pub message_count: i64,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
    System,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "bot" => Some(Self::Bot),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// Role name in a completion request.
    pub fn completion_role(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot | Self::System => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    #[serde(rename = "messageId")]
    pub id: String,
    #[serde(rename = "chatId")]
    pub chat_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub sender: Sender,
    #[serde(rename = "message")]
    pub text: String,
    pub pictures: Vec<String>,
    pub voices: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when storing a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub chat_id: String,
    pub user_id: String,
    pub sender: Sender,
    pub text: String,
    pub pictures: Vec<String>,
    pub voices: Vec<String>,
}
