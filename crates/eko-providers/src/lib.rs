//! # eko-providers
//!
//! Outbound clients behind the `eko-core` traits: an OpenAI-compatible
//! completion provider and a Firebase Identity Toolkit identity provider.

pub mod firebase;
pub mod openai;

#[cfg(test)]
mod test_server;

pub use firebase::FirebaseIdentity;
pub use openai::OpenAiProvider;
