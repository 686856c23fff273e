//! Completion provider trait — the single contract both backends satisfy.

use async_trait::async_trait;

use parley_core::{ChatError, GenerationConfig, Message};

use crate::stream::ReplyStream;

/// Everything one streaming call needs. The system prompt travels
/// separately from the history; the history never contains a system entry.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub model: String,
    /// Caller-supplied credential for this call only. Never shared across
    /// calls or logged.
    pub api_key: String,
    pub system_prompt: String,
    pub history: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Assemble a request from a generation config plus the computed
    /// system prompt and history.
    pub fn new(config: &GenerationConfig, system_prompt: String, history: Vec<Message>) -> Self {
        CompletionRequest {
            model: config.model().to_string(),
            api_key: config.api_key.clone(),
            system_prompt,
            history,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Pre-flight credential check shared by both providers. Fails before
    /// any request is sent.
    pub(crate) fn require_api_key(
        &self,
        provider: parley_core::ProviderKind,
    ) -> Result<&str, ChatError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(ChatError::MissingCredential { provider });
        }
        Ok(key)
    }
}

/// Trait both completion backends implement.
///
/// `stream` either fails before the first fragment (credential, connect,
/// HTTP status) or returns a [`ReplyStream`] whose fragments concatenate,
/// in emission order, to the provider's full generated reply.
#[async_trait]
pub trait CompletionProvider: Send + Sync + std::fmt::Debug {
    /// Open a streaming completion call.
    async fn stream(&self, request: &CompletionRequest) -> Result<ReplyStream, ChatError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::ProviderKind;

    #[test]
    fn test_request_from_config() {
        let mut config = GenerationConfig::new(ProviderKind::Anthropic, "sk-ant");
        config.max_tokens = 512;
        let request =
            CompletionRequest::new(&config, "be brief".into(), vec![Message::user("hi")]);
        assert_eq!(request.model, "claude-3-sonnet-20240229");
        assert_eq!(request.max_tokens, 512);
        assert_eq!(request.history.len(), 1);
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let config = GenerationConfig::new(ProviderKind::OpenAi, "   ");
        let request = CompletionRequest::new(&config, String::new(), Vec::new());
        let err = request.require_api_key(ProviderKind::OpenAi).unwrap_err();
        assert!(matches!(err, ChatError::MissingCredential { .. }));
    }
}
