use thiserror::Error;

/// Top-level error type for Eko.
#[derive(Debug, Error)]
pub enum EkoError {
    /// Error from the completion provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from the identity provider.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// Locale catalog could not be loaded.
    #[error("locale error: {0}")]
    Locale(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures reported by an identity provider.
///
/// The first variants are the ones handlers turn into dedicated
/// user-facing messages; everything else lands in `Other`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("email already exists")]
    EmailExists,

    #[error("password is too weak")]
    WeakPassword,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("identity provider is not configured")]
    NotConfigured,

    #[error("{0}")]
    Other(String),
}

impl IdentityError {
    /// Map a provider error code (e.g. `"WEAK_PASSWORD : Password should be
    /// at least 6 characters"`) to a variant.
    pub fn from_code(code: &str) -> Self {
        let head = code.split(':').next().unwrap_or_default().trim();
        match head {
            "EMAIL_EXISTS" => Self::EmailExists,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND"
            | "USER_DISABLED" => Self::InvalidCredentials,
            "USER_NOT_FOUND" => Self::UserNotFound,
            _ => Self::Other(code.to_string()),
        }
    }
}
