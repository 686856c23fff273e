//! In-memory conversation state.
//!
//! A `Conversation` lives for one interactive session and is append-only
//! while a turn is in flight. The `seeded` flag makes the
//! insert-system-message-exactly-once rule an explicit piece of state
//! instead of an implicit first-call check.

use tracing::debug;

use crate::types::{Message, Role};

/// Ordered message history for one session.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Set once the persona system message has been inserted.
    seeded: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Conversation::default()
    }

    /// Insert the merged persona instruction at position 0, once per
    /// conversation lifetime. Later calls are no-ops.
    pub fn seed_system(&mut self, system_prompt: impl Into<String>) {
        if self.seeded {
            return;
        }
        debug!("seeding persona system message");
        self.messages.insert(0, Message::system(system_prompt));
        self.seeded = true;
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// History as sent to a provider: everything except the persisted
    /// system entry. Providers get the system prompt as a separate
    /// parameter, not as a duplicated history message.
    pub fn history_for_model(&self) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Reset to a fresh conversation. The persona seed is re-armed so the
    /// next submit may insert it again.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.seeded = false;
    }

    /// Plain-text export, one `role: content` line per message.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_system_inserts_at_front_once() {
        let mut conv = Conversation::new();
        conv.push_user("hello");
        conv.seed_system("you are an interviewee");
        conv.seed_system("should be ignored");

        assert!(conv.is_seeded());
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.messages()[0].content, "you are an interviewee");
        assert_eq!(
            conv.messages()
                .iter()
                .filter(|m| m.role == Role::System)
                .count(),
            1
        );
    }

    #[test]
    fn test_history_for_model_excludes_system() {
        let mut conv = Conversation::new();
        conv.seed_system("persona");
        conv.push_user("q1");
        conv.push_assistant("a1");

        let history = conv.history_for_model();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.role != Role::System));
    }

    #[test]
    fn test_clear_rearms_seed() {
        let mut conv = Conversation::new();
        conv.seed_system("persona");
        conv.push_user("q");
        conv.clear();

        assert!(conv.is_empty());
        assert!(!conv.is_seeded());
        conv.seed_system("persona again");
        assert_eq!(conv.len(), 1);
    }

    #[test]
    fn test_transcript_format() {
        let mut conv = Conversation::new();
        conv.push_user("Why carpentry?");
        conv.push_assistant("My grandfather's workshop.");

        assert_eq!(
            conv.transcript(),
            "user: Why carpentry?\nassistant: My grandfather's workshop."
        );
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(Conversation::new().transcript(), "");
    }
}
