//! Settings schema.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! Everything is optional with defaults, so a partial or empty file loads.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChatError;
use crate::types::{GenerationConfig, ProviderKind};

/// Persisted settings — the CLI's counterpart to the original settings
/// surface (provider choice, credential, temperature, max length, persona
/// context).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Provider identifier: `"openai"` or `"anthropic"`.
    pub provider: String,
    /// Model override; empty `None` uses the provider default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API key. May be left empty and supplied via the provider's
    /// environment variable instead.
    pub api_key: String,
    /// Sampling temperature in [0.0, 1.0].
    pub temperature: f32,
    /// Maximum tokens per reply.
    pub max_tokens: u32,
    /// Interviewee background fed into the persona instruction.
    pub context: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            provider: ProviderKind::OpenAi.as_str().to_string(),
            model: None,
            api_key: String::new(),
            temperature: 0.7,
            max_tokens: 250,
            context: String::new(),
        }
    }
}

impl Settings {
    /// Parse the configured provider identifier.
    pub fn provider_kind(&self) -> Result<ProviderKind, ChatError> {
        self.provider.parse()
    }

    /// The API key for `kind`: the configured key, falling back to the
    /// provider's environment variable. Empty string when neither is set.
    pub fn resolved_api_key(&self, kind: ProviderKind) -> String {
        if !self.api_key.trim().is_empty() {
            return self.api_key.clone();
        }
        match std::env::var(kind.api_key_env()) {
            Ok(key) => {
                debug!(env = kind.api_key_env(), "using API key from environment");
                key
            }
            Err(_) => String::new(),
        }
    }

    /// Build the per-call generation config from these settings.
    pub fn generation_config(&self) -> Result<GenerationConfig, ChatError> {
        let provider = self.provider_kind()?;
        Ok(GenerationConfig {
            provider,
            api_key: self.resolved_api_key(provider),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
