//! Conversation orchestration — owns the submit flow: seed the persona,
//! append the user turn, drive the provider stream, commit the assistant
//! reply once the stream completes.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, TurnStream};
