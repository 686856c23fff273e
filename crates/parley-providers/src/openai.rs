//! OpenAI chat-completions client (streaming).
//!
//! Request: ordered role-tagged message list with the system prompt as the
//! distinguished first entry, `stream: true`. Response: SSE chunks, each
//! optionally carrying an incremental `delta.content`; delta-less chunks
//! (role preambles, usage frames) are skipped, never emitted as empty
//! fragments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use parley_core::{ChatError, ProviderKind};

use crate::sse::{self, Decoded};
use crate::stream::ReplyStream;
use crate::traits::{CompletionProvider, CompletionRequest};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Streaming client for the OpenAI chat-completions API.
#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_base: String,
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiProvider {
    pub fn new() -> Self {
        OpenAiProvider {
            // No overall request timeout: streams stay open as long as the
            // provider keeps generating. Callers abandon consumption to
            // cut a call short.
            client: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (proxies, compatible servers, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn stream(&self, request: &CompletionRequest) -> Result<ReplyStream, ChatError> {
        let api_key = request.require_api_key(ProviderKind::OpenAi)?;

        let mut messages = Vec::with_capacity(request.history.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: &request.system_prompt,
        });
        messages.extend(request.history.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        let body = ChatCompletionsRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: true,
        };

        debug!(
            model = %request.model,
            turns = request.history.len(),
            "opening OpenAI completion stream"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
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
            error!(status = %status, body = %text, "OpenAI API error");
            return Err(ChatError::Stream(format!("{status}: {text}")));
        }

        Ok(ReplyStream::new(sse::fragment_stream(response, decode_chunk)))
    }

    fn display_name(&self) -> &str {
        "OpenAI"
    }
}

/// Interpret one `data:` payload from the chat-completions stream.
fn decode_chunk(payload: &str) -> Decoded {
    if payload == "[DONE]" {
        return Decoded::Done;
    }
    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => match chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
        {
            Some(text) if !text.is_empty() => Decoded::Text(text),
            _ => Decoded::Skip,
        },
        Err(e) => {
            warn!("skipping malformed stream chunk: {e}");
            Decoded::Skip
        }
    }
}

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
