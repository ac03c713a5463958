//! Intent classification.
//!
//! The first pipeline stage. A small model reads the user's question and
//! answers with a JSON array naming which processing steps the question
//! needs; later stages dispatch on that set. Parsing is strict: a reply
//! that is not a JSON array of known labels fails the query rather than
//! being guessed at, and the raw reply is embedded in the error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::llm::ChatModel;
use crate::llm::types::{ChatRequest, Message};

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// One processing step the classifier can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    /// Narrow the register down to rows matching a condition.
    FilterData,
    /// Produce a narrative summary of register data.
    SummariseRisks,
    /// Answer directly; the question is not served by filtering or
    /// summarising alone.
    Other,
}

impl IntentLabel {
    /// The wire name the classifier uses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilterData => "filter_data",
            Self::SummariseRisks => "summarise_risks",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of labels one classification produced.
///
/// Duplicate-free and insertion-ordered. The order the classifier chose is
/// preserved for display, but dispatch only ever asks [`contains`](Self::contains).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntentSet {
    labels: Vec<IntentLabel>,
}

impl IntentSet {
    /// The empty set. A query can legitimately need no processing steps.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Does the set contain this label?
    pub fn contains(&self, label: IntentLabel) -> bool {
        self.labels.contains(&label)
    }

    /// True when the classifier requested no steps at all.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Labels in the order the classifier produced them.
    pub fn iter(&self) -> impl Iterator<Item = IntentLabel> + '_ {
        self.labels.iter().copied()
    }
}

impl FromIterator<IntentLabel> for IntentSet {
    fn from_iter<I: IntoIterator<Item = IntentLabel>>(iter: I) -> Self {
        let mut labels = Vec::new();
        for label in iter {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        Self { labels }
    }
}

impl std::fmt::Display for IntentSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for label in &self.labels {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(label.as_str())?;
            first = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Classification prompt
// ---------------------------------------------------------------------------

const CLASSIFY_PROMPT: &str = "\
You are an intent classifier for a corporate risk register assistant. \
Decide which processing steps a user's question needs.

The available labels are:
- \"filter_data\": the question asks to narrow the register down to rows \
matching some condition (region, status, owner, score, date, risk type, and \
so on).
- \"summarise_risks\": the question asks for a summary, overview or trend \
reading of register data.
- \"other\": the question needs a direct answer instead: definitions, \
advice, comparisons with the outside world, or anything else that filtering \
and summarising alone cannot answer.

A question can need several steps. \"Summarise the open risks in the North \
region\" needs [\"filter_data\", \"summarise_risks\"]. \"What does SHE stand \
for?\" needs [\"other\"]. \"Which risks does Sarah own, and are they worse \
than industry norms?\" needs [\"filter_data\", \"other\"].

Respond with a JSON array of labels and nothing else, for example \
[\"filter_data\"]. No markdown, no code fences, no commentary.";

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// The intent classification stage.
pub struct IntentClassifier {
    llm: Arc<dyn ChatModel>,
    model: String,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Classify a user question into its intent set.
    ///
    /// Runs at temperature 0.0; classification must be repeatable.
    pub async fn classify(&self, query: &str) -> Result<IntentSet> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::system(CLASSIFY_PROMPT), Message::user(query)],
            temperature: Some(0.0),
            max_tokens: Some(64),
        };

        let raw = self.llm.chat(&request).await?;
        let intents = parse_labels(&raw)?;
        tracing::debug!(intents = %intents, "query classified");
        Ok(intents)
    }
}

/// Parse the classifier's reply: a bare JSON array of known labels.
fn parse_labels(raw: &str) -> Result<IntentSet> {
    let labels: Vec<IntentLabel> =
        serde_json::from_str(raw.trim()).map_err(|e| AgentError::IntentParseFailed {
            reason: format!("{e}\nRaw response:\n{raw}"),
        })?;
    Ok(labels.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
