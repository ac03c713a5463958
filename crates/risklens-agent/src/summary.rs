//! Data summarisation.
//!
//! The third pipeline stage. A model receives the register rows (filtered
//! or complete) as JSON records alongside the user's question and writes a
//! narrative reading of them. The payload labels the rows honestly:
//! `filtered_data` when a filter narrowed them, `complete_unfiltered_data`
//! when the whole register is being summarised, so the model never presents
//! a full-register summary as if it were an answer to a narrower question.

use std::sync::Arc;

use serde::Serialize;

use risklens_core::RiskRegister;

use crate::error::{AgentError, Result};
use crate::intent::{IntentLabel, IntentSet};
use crate::llm::ChatModel;
use crate::llm::types::{ChatRequest, Message};

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The JSON object handed to the summariser as its user message.
/// Exactly one of the two data fields is present.
#[derive(Debug, Serialize)]
struct SummaryPayload<'a> {
    user_prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filtered_data: Option<&'a [serde_json::Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    complete_unfiltered_data: Option<&'a [serde_json::Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_explanation: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Summarisation prompt
// ---------------------------------------------------------------------------

const SUMMARY_PROMPT: &str = "\
You are a risk analyst writing for the owners of a corporate risk register. \
You receive a JSON object with the user's question under \"user_prompt\" and \
register rows under exactly one of two keys: \"filtered_data\" means the \
rows were already narrowed by a filter (described under \
\"filter_explanation\"), \"complete_unfiltered_data\" means you are looking \
at the whole register.

Write a concise narrative summary of the rows in the context of the \
question: the overall picture, notable concentrations by region, contract, \
owner or risk type, standout entries by score or financial impact, and \
anything time-critical. Ground every claim in the rows you were given. If \
the rows are empty, say plainly that no risks match.

Answer in plain prose, a few short paragraphs at most. No markdown \
headings, no tables, no JSON.";

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// The summarisation stage.
pub struct SummaryGenerator {
    llm: Arc<dyn ChatModel>,
    model: String,
}

impl SummaryGenerator {
    pub fn new(llm: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Summarise `data` in the context of the user's question.
    ///
    /// The intent set decides how the rows are labelled in the payload:
    /// with `filter_data` present they are `filtered_data`, otherwise they
    /// are `complete_unfiltered_data`. Runs at temperature 0.2, the one
    /// stage allowed a little latitude in phrasing.
    pub async fn summarize(
        &self,
        query: &str,
        data: &RiskRegister,
        filter_explanation: Option<&str>,
        intents: &IntentSet,
    ) -> Result<String> {
        let records = data.records();
        let filtered = intents.contains(IntentLabel::FilterData);
        let payload = SummaryPayload {
            user_prompt: query,
            filtered_data: filtered.then_some(records.as_slice()),
            complete_unfiltered_data: (!filtered).then_some(records.as_slice()),
            filter_explanation,
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(SUMMARY_PROMPT),
                Message::user(serde_json::to_string(&payload)?),
            ],
            temperature: Some(0.2),
            max_tokens: None,
        };

        let raw = self.llm.chat(&request).await?;
        let text = raw.trim();
        if text.is_empty() {
            return Err(AgentError::EmptyResponse {
                stage: "summary".into(),
            });
        }
        Ok(text.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
