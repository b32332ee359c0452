//! Role-tagged prompt construction.

use serde::{Deserialize, Serialize};

/// The fixed persona and instructions for the assistant.
pub const SYSTEM_PERSONA: &str = "You are a very enthusiastic airline representative who loves \
to help people! Given the following CONTEXT from the airline baggage documentation, answer the \
question using only that information.";

/// One role-tagged message in a chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// The message role (`system` or `user`).
    pub role: String,
    /// The message content.
    pub content: String,
}

impl ChatMessage {
    /// Create a `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    /// Create a `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

/// Build the two-message prompt for one question.
///
/// Exactly one `system` message carries the fixed persona; one `user` message
/// carries the assembled context block and the raw question. An empty context
/// still produces a well-formed prompt.
pub fn build_messages(context: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PERSONA),
        ChatMessage::user(format!("CONTEXT: \n{context}\n\nUSER QUESTION: {question}")),
    ]
}
