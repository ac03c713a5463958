//! Final answers.
//!
//! The last pipeline stage. It runs whenever classification decided the
//! question needs more than filtering and summarising: definitions, advice,
//! comparisons with the outside world, or questions that are not really
//! about the register at all. It receives whatever the earlier stages
//! produced and weaves it into one direct reply.

use std::sync::Arc;

use serde::Serialize;

use risklens_core::RiskRegister;

use crate::error::{AgentError, Result};
use crate::llm::ChatModel;
use crate::llm::types::{ChatRequest, Message};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The JSON object handed to the final-answer model. Absent context is
/// omitted rather than sent as null, so the model only ever sees keys that
/// carry something.
#[derive(Debug, Serialize)]
struct AnswerPayload<'a> {
    user_prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prior_summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_explanation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filtered_data: Option<&'a [serde_json::Value]>,
}

// ---------------------------------------------------------------------------
// Answer prompt
// ---------------------------------------------------------------------------

const ANSWER_PROMPT: &str = "\
You are the closing voice of a corporate risk register assistant. You \
receive a JSON object with the user's question under \"user_prompt\", and \
possibly some of: \"prior_summary\" (a summary already written for this \
question), \"filter_explanation\" (how the register was narrowed) and \
\"filtered_data\" (the matching rows, present only when no summary was \
written).

Answer the question directly, weaving in whatever context you were given \
rather than repeating it back. When the question is not really about \
corporate or project risk, open with a light acknowledgement such as \
\"This isn't exactly related to risk, but\" and then answer it anyway.

Keep the reply short, a paragraph or two. Plain prose, no JSON.";

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// The final-answer stage.
pub struct FinalAnswerGenerator {
    llm: Arc<dyn ChatModel>,
    model: String,
}

impl FinalAnswerGenerator {
    pub fn new(llm: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Produce the final answer from the question plus whatever context the
    /// earlier stages produced. All three context inputs are optional; the
    /// orchestrator decides what to pass.
    pub async fn answer(
        &self,
        query: &str,
        prior_summary: Option<&str>,
        filter_explanation: Option<&str>,
        filtered: Option<&RiskRegister>,
    ) -> Result<String> {
        let records = filtered.map(RiskRegister::records);
        let payload = AnswerPayload {
            user_prompt: query,
            prior_summary,
            filter_explanation,
            filtered_data: records.as_deref(),
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(ANSWER_PROMPT),
                Message::user(serde_json::to_string(&payload)?),
            ],
            temperature: Some(0.0),
            max_tokens: None,
        };

        let raw = self.llm.chat(&request).await?;
        let text = raw.trim();
        if text.is_empty() {
            return Err(AgentError::EmptyResponse {
                stage: "final answer".into(),
            });
        }
        Ok(text.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
