//! Core types for Parley — messages, conversation state, persona merging,
//! the error taxonomy, and settings.
//!
//! Nothing in this crate touches the network; the provider clients live in
//! `parley-providers` and the turn orchestration in `parley-chat`.

pub mod config;
pub mod conversation;
pub mod error;
pub mod persona;
pub mod types;
pub mod utils;

pub use conversation::Conversation;
pub use error::ChatError;
pub use persona::PersonaInstruction;
pub use types::{GenerationConfig, Message, ProviderKind, Role};
