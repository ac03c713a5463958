//! Core types for model interaction.
//!
//! These types model the data flowing between the query pipeline and the
//! chat completions endpoint. [`Message`] serializes directly into the wire
//! format, so request bodies are assembled with plain serde rather than by
//! hand.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// The role of a participant in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions that shape model behavior.
    System,
    /// Input from the human user.
    User,
    /// Output from the model.
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who produced this message.
    pub role: Role,

    /// The textual content of the message.
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    ///
    /// Assistant messages are never constructed here; every stage is a
    /// single system+user round-trip, so assistant content only ever
    /// arrives from the wire.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat request
// ---------------------------------------------------------------------------

/// A full request to send to the chat completions endpoint.
///
/// Every pipeline stage sets `model` and `temperature` explicitly; which
/// model answers and how deterministically is part of each stage's
/// contract, not something the transport decides.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The model identifier (e.g. `"gpt-4.1-nano"`).
    pub model: String,

    /// The conversation to complete.
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 = deterministic).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens the model may generate in this reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_to_wire_format() {
        let wire = serde_json::to_value(Message::system("You classify queries.")).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({"role": "system", "content": "You classify queries."})
        );
    }

    #[test]
    fn completion_message_deserializes_from_wire_format() {
        // The shape a Chat Completions reply carries its text in.
        let message: Message =
            serde_json::from_value(serde_json::json!({"role": "assistant", "content": "Open."}))
                .unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Open.");
    }

    #[test]
    fn absent_knobs_are_omitted() {
        let request = ChatRequest {
            model: "gpt-4.1".into(),
            messages: vec![Message::user("hi")],
            temperature: None,
            max_tokens: None,
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire.get("temperature").is_none());
        assert!(wire.get("max_tokens").is_none());
    }
}
