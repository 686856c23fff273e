//! Persona instruction — the role-play directive plus free-text
//! interviewee background, merged into one system prompt.

/// Built-in role-play directive. The interviewee persona is filled in by
/// the per-session context.
pub const BASE_PROMPT: &str = "\
You are being interviewed by the user who is a professor from one of the \
world's leading universities specializing in qualitative research methods. \
Based on the additional context provided, you will take on the role of the \
specified interviewee.

The interview aims to explore the different dimensions and factors that \
influenced your (the interviewee's) choice of profession and career path.

During the interview:
- Respond as the specified persona, maintaining consistency with the background provided
- Do NOT break character
- Answer questions openly and honestly, sharing relevant experiences, events, people, places, or practices that influenced your decisions
- Provide specific details and examples to give a deeper understanding of your professional journey
- Feel free to express views and beliefs that align with your assigned persona
- Match the tone, style, slang, and personality of the persona
- If you find any question unclear, don't hesitate to ask for clarification
- Stay in character throughout the conversation
- If relevant to the question, add interesting professional anecdotes or examples, but keep it short and concise

The professor (user) will begin the interview with their questions. Do not \
break character, do not refer to the user as 'user' or Professor. Be polite \
and casual.";

/// Separator between the base directive and the session context.
const CONTEXT_SEPARATOR: &str = "\n\nAdditional Context:\n";

/// Base role-play directive plus interviewee background.
///
/// `effective_prompt` recomputes the merge on every call — the context may
/// change mid-conversation and must be honored immediately, so the merged
/// prompt is never cached.
#[derive(Clone, Debug)]
pub struct PersonaInstruction {
    pub base_prompt: String,
    pub context: String,
}

impl Default for PersonaInstruction {
    fn default() -> Self {
        PersonaInstruction {
            base_prompt: BASE_PROMPT.to_string(),
            context: String::new(),
        }
    }
}

impl PersonaInstruction {
    /// The built-in directive with the given interviewee background.
    pub fn with_context(context: impl Into<String>) -> Self {
        PersonaInstruction {
            base_prompt: BASE_PROMPT.to_string(),
            context: context.into(),
        }
    }

    pub fn has_context(&self) -> bool {
        !self.context.trim().is_empty()
    }

    /// The system prompt for the next call: base directive, plus the
    /// context when one is set.
    pub fn effective_prompt(&self) -> String {
        if self.has_context() {
            format!("{}{}{}", self.base_prompt, CONTEXT_SEPARATOR, self.context)
        } else {
            self.base_prompt.clone()
        }
    }
}
