//! Streaming provider layer for Parley.
//!
//! Two structurally different streaming APIs — OpenAI-style chat-completion
//! deltas and Anthropic-style message events — are normalized behind one
//! contract: [`traits::CompletionProvider::stream`] returns a
//! [`stream::ReplyStream`], a lazy sequence of text fragments that also
//! accumulates the full reply.
//!
//! # Architecture
//!
//! - [`traits::CompletionProvider`] — trait both clients implement
//! - [`stream::ReplyStream`] — the uniform fragment stream + close probe
//! - [`sse`] — incremental server-sent-events line decoding
//! - [`openai::OpenAiProvider`] / [`anthropic::AnthropicProvider`] — clients
//! - [`registry::ProviderRegistry`] — kind → provider dispatch

pub mod anthropic;
pub mod openai;
pub mod registry;
pub mod sse;
pub mod stream;
pub mod traits;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use registry::ProviderRegistry;
pub use stream::{CloseProbe, ReplyStream};
pub use traits::{CompletionProvider, CompletionRequest};
