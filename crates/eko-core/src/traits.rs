use crate::{
    context::Context,
    error::{EkoError, IdentityError},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Text returned by a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Completion {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u64>,
    pub processing_time_ms: u64,
}

/// Completion provider trait.
///
/// Used for bot replies and chat titles. Any chat-completion backend
/// implements this to provide a uniform interface.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Send a conversation context to the provider and get a response.
    async fn complete(&self, context: &Context) -> Result<Completion, EkoError>;

    /// Check if the provider is available and ready.
    async fn is_available(&self) -> bool;
}

/// An account held by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityAccount {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Identity provider trait.
///
/// Owns credentials. Local user records only mirror the account id.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Create an email/password account.
    async fn create_user(&self, email: &str, password: &str)
        -> Result<IdentityAccount, IdentityError>;

    /// Check an email/password pair.
    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityAccount, IdentityError>;

    /// Send a password-reset email. Returns the reset link when the
    /// provider exposes one.
    async fn send_password_reset(&self, email: &str) -> Result<Option<String>, IdentityError>;

    async fn update_display_name(&self, uid: &str, name: &str) -> Result<(), IdentityError>;

    async fn delete_user(&self, uid: &str) -> Result<(), IdentityError>;

    /// Current display name, `None` when unset.
    async fn display_name(&self, uid: &str) -> Result<Option<String>, IdentityError>;
}
