//! Filter generation.
//!
//! The second pipeline stage. A model translates the user's request into a
//! filter expression in the restricted grammar defined by
//! [`risklens_core::expr`], together with a plain-language explanation of
//! what the filter keeps. The reply must be one bare JSON object; anything
//! else fails the query with the raw reply embedded in the error.
//!
//! This stage only parses. Schema validation happens where the filter is
//! applied, so a filter that names a nonexistent column is caught before a
//! single row is evaluated, not here.

use std::sync::Arc;

use serde::Deserialize;

use risklens_core::{FilterExpr, schema};

use crate::error::{AgentError, Result};
use crate::llm::ChatModel;
use crate::llm::types::{ChatRequest, Message};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A parsed filter reply.
///
/// The explanation is the model's own description of the filter. It travels
/// with the subset through the rest of the pipeline and is shown to the
/// user next to the filtered rows.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedFilter {
    /// The expression, deserialized straight from the reply.
    #[serde(rename = "filter")]
    pub expr: FilterExpr,
    /// One to three sentences describing the filter.
    pub explanation: String,
}

// ---------------------------------------------------------------------------
// Generation prompt
// ---------------------------------------------------------------------------

const PROMPT_INTRO: &str = "\
You are a filter writer for a corporate risk register. Translate the user's \
request into a filter expression over the register.

The register has exactly these columns:
";

const PROMPT_RULES: &str = "\

Filter expressions are JSON trees built from four node types:
- {\"type\": \"compare\", \"column\": <name>, \"op\": <\"eq\"|\"ne\"|\"lt\"|\"le\"|\"gt\"|\"ge\">, \"value\": <literal>}
- {\"type\": \"contains\", \"column\": <name>, \"value\": <text>} (matching ignores case; add \"case_sensitive\": true only when case matters)
- {\"type\": \"and\", \"clauses\": [<expressions>]}
- {\"type\": \"or\", \"clauses\": [<expressions>]}

Rules:
- Use only the listed column names, spelled exactly as shown.
- The literal's JSON type must match the column: text columns take strings, \
number columns take numbers, boolean columns take true or false.
- Ordering operators (lt, le, gt, ge) never apply to boolean columns, and \
containment applies only to text columns.
- Date columns (\"Date Raised\", \"Date Updated\", \"By When\") hold \
yyyy-mm-dd text. Compare them as strings: \"risks raised this year\" becomes \
\"Date Raised\" ge \"2024-01-01\" style comparisons.
- Filter only on objective conditions. For a subjective request such as \
\"risks with weak mitigation\", choose the closest objectively checkable \
condition instead (for example a post-mitigation score threshold) and say \
so in the explanation.

Respond with a single JSON object and nothing else. No markdown, no code \
fences, no commentary:
{\"filter\": <expression>, \"explanation\": <one to three sentences describing the filter in plain language>}

Example, for \"Show reputational risks in the north region\":
{\"filter\": {\"type\": \"and\", \"clauses\": [{\"type\": \"compare\", \"column\": \"Risk Type - Reputational\", \"op\": \"eq\", \"value\": true}, {\"type\": \"contains\", \"column\": \"Contract:Region\", \"value\": \"north\"}]}, \"explanation\": \"Keeps rows flagged as reputational risks whose contract region contains 'north'.\"}";

/// Assemble the system prompt with the current schema spliced in.
fn build_system_prompt() -> String {
    let mut prompt = String::from(PROMPT_INTRO);
    for col in schema::COLUMNS {
        prompt.push_str(&format!("- \"{}\" ({})\n", col.name, col.kind));
    }
    prompt.push_str(PROMPT_RULES);
    prompt
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// The filter generation stage.
pub struct FilterGenerator {
    llm: Arc<dyn ChatModel>,
    model: String,
}

impl FilterGenerator {
    pub fn new(llm: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Translate a user question into a filter and its explanation.
    ///
    /// Runs at temperature 0.0; the same question should keep producing
    /// the same filter.
    pub async fn generate(&self, query: &str) -> Result<GeneratedFilter> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(build_system_prompt()),
                Message::user(query),
            ],
            temperature: Some(0.0),
            max_tokens: None,
        };

        let raw = self.llm.chat(&request).await?;
        parse_filter(&raw)
    }
}

/// Parse the generator's reply: one bare JSON object with `filter` and
/// `explanation` fields.
fn parse_filter(raw: &str) -> Result<GeneratedFilter> {
    serde_json::from_str(raw.trim()).map_err(|e| AgentError::FilterParseFailed {
        reason: format!("{e}\nRaw response:\n{raw}"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
