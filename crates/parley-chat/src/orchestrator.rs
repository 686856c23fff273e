//! The submit flow.
//!
//! One submission = one turn: pre-flight checks (no side effects on
//! failure), seed the persona system message on first use, append the
//! user message, stream the reply, commit the assistant message on
//! natural completion. A failed or abandoned stream leaves the user
//! message in place and appends nothing.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tracing::{debug, warn};

use parley_core::{ChatError, Conversation, GenerationConfig, PersonaInstruction};
use parley_providers::{CloseProbe, CompletionRequest, ProviderRegistry, ReplyStream};

/// Drives turns against provider streams.
pub struct Orchestrator {
    registry: ProviderRegistry,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// Orchestrator over the two real provider clients.
    pub fn new() -> Self {
        Orchestrator {
            registry: ProviderRegistry::with_defaults(),
        }
    }

    /// Orchestrator over a caller-supplied registry (tests, proxies).
    pub fn with_registry(registry: ProviderRegistry) -> Self {
        Orchestrator { registry }
    }

    /// Submit one user message and open the reply stream.
    ///
    /// Pre-flight failures (unknown provider, missing credential) return
    /// `Err` with the conversation untouched — "no message was attempted".
    /// Once the user message is appended, any later failure leaves it in
    /// the history; no assistant message is appended unless the stream
    /// runs to natural completion.
    ///
    /// The returned [`TurnStream`] borrows the conversation mutably, so at
    /// most one turn per conversation can be in flight at a time.
    pub async fn submit<'c>(
        &self,
        user_text: &str,
        config: &GenerationConfig,
        persona: &PersonaInstruction,
        conversation: &'c mut Conversation,
    ) -> Result<TurnStream<'c>, ChatError> {
        // Pre-flight: resolve the provider and check the credential before
        // any history mutation.
        let provider = self.registry.resolve(config.provider)?;
        if config.api_key.trim().is_empty() {
            return Err(ChatError::MissingCredential {
                provider: config.provider,
            });
        }

        // Persist the persona once, at first use with a non-empty context.
        if !conversation.is_seeded() && persona.has_context() {
            conversation.seed_system(persona.effective_prompt());
        }

        conversation.push_user(user_text);

        // The effective prompt is recomputed every call, independent of
        // what was seeded — a context change applies immediately.
        let request = CompletionRequest::new(
            config,
            persona.effective_prompt(),
            conversation.history_for_model(),
        );

        debug!(
            provider = provider.display_name(),
            model = %request.model,
            turns = request.history.len(),
            "submitting turn"
        );

        let inner = provider.stream(&request).await?;
        Ok(TurnStream {
            conversation,
            inner,
            failed: false,
            committed: false,
        })
    }
}

/// Reply stream for one turn.
///
/// Re-emits every provider fragment unchanged, in order. When the stream
/// ends naturally the accumulated reply is committed to the conversation
/// as the assistant message; after an error or an early drop nothing is
/// committed.
pub struct TurnStream<'c> {
    conversation: &'c mut Conversation,
    inner: ReplyStream,
    failed: bool,
    committed: bool,
}

impl std::fmt::Debug for TurnStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnStream")
            .field("failed", &self.failed)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}

impl TurnStream<'_> {
    /// Fragments accumulated so far.
    pub fn reply(&self) -> &str {
        self.inner.reply()
    }

    /// Probe reporting release of the provider's streaming resource.
    pub fn close_probe(&self) -> CloseProbe {
        self.inner.close_probe()
    }

    /// Drain the stream and return the full reply, or the first error.
    /// The assistant message is committed exactly as in incremental
    /// consumption.
    pub async fn collect(mut self) -> Result<String, ChatError> {
        use futures::StreamExt;
        while let Some(fragment) = self.next().await {
            fragment?;
        }
        Ok(self.reply().to_string())
    }
}

impl Stream for TurnStream<'_> {
    type Item = Result<String, ChatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(fragment))) => Poll::Ready(Some(Ok(fragment))),
            Poll::Ready(Some(Err(e))) => {
                warn!("turn failed mid-stream: {e}");
                this.failed = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if !this.failed && !this.committed {
                    this.committed = true;
                    let reply = this.inner.reply().to_string();
                    debug!(chars = reply.len(), "committing assistant reply");
                    this.conversation.push_assistant(reply);
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use futures::StreamExt;

    use parley_core::{Message, ProviderKind, Role};
    use parley_providers::CompletionProvider;

    /// Provider stand-in that replays a script and records every request.
    #[derive(Debug)]
    struct ScriptedProvider {
        /// `Ok` fragments and `Err` markers, replayed per call.
        script: Vec<Result<String, String>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<&str, &str>>) -> Arc<Self> {
            Arc::new(ScriptedProvider {
                script: script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn recorded(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn stream(&self, request: &CompletionRequest) -> Result<ReplyStream, ChatError> {
            self.requests.lock().unwrap().push(request.clone());
            let items: Vec<Result<String, ChatError>> = self
                .script
                .iter()
                .map(|r| r.clone().map_err(ChatError::Stream))
                .collect();
            Ok(ReplyStream::new(futures::stream::iter(items)))
        }

        fn display_name(&self) -> &str {
            "Scripted"
        }
    }

    fn orchestrator_with(provider: Arc<ScriptedProvider>) -> Orchestrator {
        let mut registry = ProviderRegistry::new();
        registry.register(ProviderKind::OpenAi, provider);
        Orchestrator::with_registry(registry)
    }

    fn config() -> GenerationConfig {
        GenerationConfig::new(ProviderKind::OpenAi, "sk-test")
    }

    #[tokio::test]
    async fn test_successful_turn_commits_assistant() {
        let provider = ScriptedProvider::new(vec![Ok("Hi "), Ok("there!")]);
        let orchestrator = orchestrator_with(provider.clone());
        let persona = PersonaInstruction::default();
        let mut conversation = Conversation::new();

        let stream = orchestrator
            .submit("Hello", &config(), &persona, &mut conversation)
            .await
            .unwrap();
        let reply = stream.collect().await.unwrap();

        assert_eq!(reply, "Hi there!");
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.messages()[0], Message::user("Hello"));
        assert_eq!(conversation.messages()[1], Message::assistant("Hi there!"));

        // The provider saw the user turn that was just appended.
        let requests = provider.recorded();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].history, vec![Message::user("Hello")]);
    }

    #[tokio::test]
    async fn test_fragments_reemitted_in_order() {
        let provider = ScriptedProvider::new(vec![Ok("a"), Ok("b"), Ok("c")]);
        let orchestrator = orchestrator_with(provider);
        let persona = PersonaInstruction::default();
        let mut conversation = Conversation::new();

        let mut stream = orchestrator
            .submit("go", &config(), &persona, &mut conversation)
            .await
            .unwrap();

        let mut seen = Vec::new();
        while let Some(fragment) = stream.next().await {
            seen.push(fragment.unwrap());
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(stream.reply(), "abc");
    }

    #[tokio::test]
    async fn test_midstream_failure_keeps_user_message_only() {
        let provider =
            ScriptedProvider::new(vec![Ok("one "), Ok("two"), Err("connection reset")]);
        let orchestrator = orchestrator_with(provider);
        let persona = PersonaInstruction::default();
        let mut conversation = Conversation::new();

        let mut stream = orchestrator
            .submit("Hello", &config(), &persona, &mut conversation)
            .await
            .unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap(), "one ");
        assert_eq!(stream.next().await.unwrap().unwrap(), "two");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
        drop(stream);

        // No assistant entry, no rollback of the user message.
        assert_eq!(conversation.messages(), &[Message::user("Hello")]);
    }

    #[tokio::test]
    async fn test_early_drop_commits_nothing_and_releases() {
        let provider = ScriptedProvider::new(vec![Ok("one"), Ok("two"), Ok("three")]);
        let orchestrator = orchestrator_with(provider);
        let persona = PersonaInstruction::default();
        let mut conversation = Conversation::new();

        let mut stream = orchestrator
            .submit("Hello", &config(), &persona, &mut conversation)
            .await
            .unwrap();
        let probe = stream.close_probe();

        assert_eq!(stream.next().await.unwrap().unwrap(), "one");
        drop(stream);

        assert!(probe.is_closed());
        assert_eq!(conversation.messages(), &[Message::user("Hello")]);
    }

    #[tokio::test]
    async fn test_empty_context_never_seeds_system() {
        let provider = ScriptedProvider::new(vec![Ok("reply")]);
        let orchestrator = orchestrator_with(provider);
        let persona = PersonaInstruction::default();
        let mut conversation = Conversation::new();

        orchestrator
            .submit("Hello", &config(), &persona, &mut conversation)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();

        assert!(conversation
            .messages()
            .iter()
            .all(|m| m.role != Role::System));
        assert!(!conversation.is_seeded());
    }

    #[tokio::test]
    async fn test_context_seeds_once_and_changes_apply_immediately() {
        let provider = ScriptedProvider::new(vec![Ok("reply")]);
        let orchestrator = orchestrator_with(provider.clone());
        let mut persona = PersonaInstruction::with_context("Retired carpenter");
        let mut conversation = Conversation::new();

        orchestrator
            .submit("first", &config(), &persona, &mut conversation)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();

        // Context changes mid-conversation.
        persona.context = "Opera singer".to_string();
        orchestrator
            .submit("second", &config(), &persona, &mut conversation)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();

        let requests = provider.recorded();
        assert!(requests[0].system_prompt.contains("Retired carpenter"));
        assert!(requests[1].system_prompt.contains("Opera singer"));
        // The first call's already-sent request is untouched.
        assert!(!requests[0].system_prompt.contains("Opera singer"));

        // The persisted system entry stays the one seeded first, at
        // position 0, exactly once.
        assert_eq!(conversation.messages()[0].role, Role::System);
        assert!(conversation.messages()[0].content.contains("Retired carpenter"));
        assert_eq!(
            conversation
                .messages()
                .iter()
                .filter(|m| m.role == Role::System)
                .count(),
            1
        );

        // Providers never receive the system prompt as a history entry.
        assert!(requests
            .iter()
            .all(|r| r.history.iter().all(|m| m.role != Role::System)));
    }

    #[tokio::test]
    async fn test_missing_credential_touches_nothing() {
        let provider = ScriptedProvider::new(vec![Ok("reply")]);
        let orchestrator = orchestrator_with(provider.clone());
        let persona = PersonaInstruction::with_context("Carpenter");
        let mut conversation = Conversation::new();

        let mut bad_config = config();
        bad_config.api_key = "  ".to_string();

        let err = orchestrator
            .submit("Hello", &bad_config, &persona, &mut conversation)
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::MissingCredential { .. }));
        assert!(err.is_preflight());
        // No message was attempted: nothing seeded, nothing appended.
        assert!(conversation.is_empty());
        assert!(provider.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_provider_touches_nothing() {
        let orchestrator = Orchestrator::with_registry(ProviderRegistry::new());
        let persona = PersonaInstruction::default();
        let mut conversation = Conversation::new();

        let err = orchestrator
            .submit("Hello", &config(), &persona, &mut conversation)
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::UnsupportedProvider(_)));
        assert!(conversation.is_empty());
    }

    #[tokio::test]
    async fn test_empty_user_text_accepted() {
        let provider = ScriptedProvider::new(vec![Ok("still replies")]);
        let orchestrator = orchestrator_with(provider);
        let persona = PersonaInstruction::default();
        let mut conversation = Conversation::new();

        let reply = orchestrator
            .submit("", &config(), &persona, &mut conversation)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();

        assert_eq!(reply, "still replies");
        assert_eq!(conversation.messages()[0], Message::user(""));
    }
}
