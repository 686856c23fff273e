//! Anthropic messages client (streaming).
//!
//! Request: the system prompt travels in the dedicated `system` field and
//! the prior conversation is rendered as a manual transcript — `Human:` for
//! user turns, `Assistant:` otherwise — inside a single user message.
//! Response: an SSE event stream; `content_block_delta` events carry the
//! text increments, `message_stop` ends the session. The call is a scoped
//! streaming resource: dropping the returned stream closes the connection
//! whether or not the session ran to completion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use parley_core::{ChatError, ProviderKind, Role};

use crate::sse::{self, Decoded};
use crate::stream::ReplyStream;
use crate::traits::{CompletionProvider, CompletionRequest};

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Streaming client for the Anthropic messages API.
#[derive(Clone, Debug)]
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_base: String,
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AnthropicProvider {
    pub fn new() -> Self {
        AnthropicProvider {
            client: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (proxies, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base.trim_end_matches('/'))
    }

    /// Render the history as one labeled transcript for the single user
    /// turn: `Human:` for user messages, `Assistant:` for everything else.
    fn render_transcript(request: &CompletionRequest) -> String {
        let mut transcript = String::new();
        for message in &request.history {
            let label = match message.role {
                Role::User => "Human",
                _ => "Assistant",
            };
            transcript.push_str(label);
            transcript.push_str(": ");
            transcript.push_str(&message.content);
            transcript.push_str("\n\n");
        }
        transcript.trim_end().to_string()
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn stream(&self, request: &CompletionRequest) -> Result<ReplyStream, ChatError> {
        let api_key = request.require_api_key(ProviderKind::Anthropic)?;

        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system_prompt,
            stream: true,
            messages: vec![WireMessage {
                role: "user",
                content: Self::render_transcript(request),
            }],
        };

        debug!(
            model = %request.model,
            turns = request.history.len(),
            "opening Anthropic message stream"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Stream(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            error!(status = %status, body = %text, "Anthropic API error");
            return Err(ChatError::Stream(format!("{status}: {text}")));
        }

        Ok(ReplyStream::new(sse::fragment_stream(response, decode_event)))
    }

    fn display_name(&self) -> &str {
        "Anthropic"
    }
}

/// Interpret one `data:` payload from the messages event stream.
fn decode_event(payload: &str) -> Decoded {
    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(StreamEvent::ContentBlockDelta { delta }) => match delta.text {
            Some(text) if !text.is_empty() => Decoded::Text(text),
            _ => Decoded::Skip,
        },
        Ok(StreamEvent::MessageStop) => Decoded::Done,
        Ok(StreamEvent::Error { error }) => Decoded::Fail(error.message),
        Ok(StreamEvent::Other) => Decoded::Skip,
        Err(e) => {
            warn!("skipping malformed stream event: {e}");
            Decoded::Skip
        }
    }
}

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    stream: bool,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: EventDelta },
    MessageStop,
    Error { error: ApiError },
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
struct EventDelta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
