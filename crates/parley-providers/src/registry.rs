//! Provider registry — one polymorphic dispatch point instead of string
//! branching at the call sites.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use parley_core::{ChatError, ProviderKind};

use crate::anthropic::AnthropicProvider;
use crate::openai::OpenAiProvider;
use crate::traits::CompletionProvider;

/// Maps a [`ProviderKind`] to its streaming client.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn CompletionProvider>>,
}

impl ProviderRegistry {
    /// An empty registry. Useful for tests that register stand-ins.
    pub fn new() -> Self {
        ProviderRegistry::default()
    }

    /// Registry with both real clients registered.
    pub fn with_defaults() -> Self {
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::OpenAi, Arc::new(OpenAiProvider::new()));
        registry.register(ProviderKind::Anthropic, Arc::new(AnthropicProvider::new()));
        registry
    }

    pub fn register(&mut self, kind: ProviderKind, provider: Arc<dyn CompletionProvider>) {
        debug!(provider = %kind, name = provider.display_name(), "registering provider");
        self.providers.insert(kind, provider);
    }

    /// Look up the client for `kind`. An unregistered kind fails
    /// synchronously — no network is ever touched for it.
    pub fn resolve(&self, kind: ProviderKind) -> Result<Arc<dyn CompletionProvider>, ChatError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or_else(|| ChatError::UnsupportedProvider(kind.to_string()))
    }
}
