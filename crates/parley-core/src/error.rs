//! Error taxonomy.
//!
//! Three caller-distinguishable kinds, plus a config variant for the
//! settings loader. Nothing here retries; every failure surfaces to the
//! immediate caller as-is.

use thiserror::Error;

use crate::types::ProviderKind;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or empty API key. Raised before any request is sent;
    /// the caller must fix its input.
    #[error("missing API key for {provider} (set it in the config or ${})", .provider.api_key_env())]
    MissingCredential { provider: ProviderKind },

    /// Unknown provider identifier. Programmer/caller error; fatal to the
    /// call, never silently defaulted.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Transport or remote-side failure, at request time or mid-stream.
    /// Fragments emitted before the failure stay valid.
    #[error("provider stream failed: {0}")]
    Stream(String),

    /// Settings file problem (unreadable path, invalid values).
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// Whether the error happened before anything was sent to a provider.
    /// These are the "no message was attempted" failures.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            ChatError::MissingCredential { .. }
                | ChatError::UnsupportedProvider(_)
                | ChatError::Config(_)
        )
    }
}
