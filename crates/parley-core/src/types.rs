//! Message and configuration types shared across the workspace.
//!
//! Messages carry exactly a role and text content — the wire formats the two
//! providers expect are built from these in `parley-providers`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

// ─────────────────────────────────────────────
// Roles & Messages
// ─────────────────────────────────────────────

/// Speaker role of a message. Any role outside these three is a defect.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// The lowercase wire name (`"system"`, `"user"`, `"assistant"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of the conversation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// The two supported completion backends.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Identifier used in config files and CLI flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Model used when the caller doesn't pick one.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4-0125-preview",
            ProviderKind::Anthropic => "claude-3-sonnet-20240229",
        }
    }

    /// Environment variable consulted when no API key is configured.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ChatError;

    /// Parses a provider identifier. Unknown identifiers are never silently
    /// defaulted — they fail with [`ChatError::UnsupportedProvider`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(ChatError::UnsupportedProvider(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────
// Generation config
// ─────────────────────────────────────────────

/// Per-call generation parameters. Immutable for the duration of one call;
/// callers may build a fresh one for every submit.
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    /// Caller-supplied credential. Never logged.
    pub api_key: String,
    /// Model override; `None` uses the provider default.
    pub model: Option<String>,
    /// Sampling temperature in [0.0, 1.0]. Not range-checked here — the
    /// surrounding surface owns input validation.
    pub temperature: f32,
    /// Cap on generated tokens per reply.
    pub max_tokens: u32,
}

impl GenerationConfig {
    pub fn new(provider: ProviderKind, api_key: impl Into<String>) -> Self {
        GenerationConfig {
            provider,
            api_key: api_key.into(),
            model: None,
            temperature: 0.7,
            max_tokens: 250,
        }
    }

    /// The model this call will use.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
