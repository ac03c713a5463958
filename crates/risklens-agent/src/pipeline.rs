//! Query orchestration.
//!
//! [`Pipeline::run`] is the whole query lifecycle: classify the question,
//! then run only the stages its intent set asks for, threading each stage's
//! output into the next. Stages run strictly in sequence because each one
//! consumes what the previous produced. Any stage failure abandons the
//! query; there are no retries and no partial outcomes.

use std::sync::Arc;

use uuid::Uuid;

use risklens_core::RiskRegister;

use crate::answer::FinalAnswerGenerator;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::filter::FilterGenerator;
use crate::intent::{IntentClassifier, IntentLabel, IntentSet};
use crate::llm::ChatModel;
use crate::summary::SummaryGenerator;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Everything one query produced. Fields are `None` when the corresponding
/// stage did not run; a query whose intent set came back empty produces
/// nothing but the (empty) set itself.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// The labels classification produced.
    pub intents: IntentSet,
    /// The filtered subset, when `filter_data` ran.
    pub filtered: Option<RiskRegister>,
    /// The model's description of the applied filter.
    pub filter_explanation: Option<String>,
    /// The data summary, when `summarise_risks` ran.
    pub summary: Option<String>,
    /// The direct answer, when `other` ran.
    pub final_answer: Option<String>,
}

impl QueryOutcome {
    /// The narrative to show the user: the final answer when one was
    /// written (it already folds the summary in), otherwise the summary.
    pub fn narrative(&self) -> Option<&str> {
        self.final_answer.as_deref().or(self.summary.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The assembled query pipeline.
///
/// Holds no register data and no per-query state; one pipeline serves any
/// number of queries against any number of registers.
pub struct Pipeline {
    classifier: IntentClassifier,
    filterer: FilterGenerator,
    summarizer: SummaryGenerator,
    answerer: FinalAnswerGenerator,
}

impl Pipeline {
    /// Wire the four stages to one chat backend, one model name each.
    pub fn new(llm: Arc<dyn ChatModel>, config: &PipelineConfig) -> Self {
        Self {
            classifier: IntentClassifier::new(llm.clone(), config.classifier_model.clone()),
            filterer: FilterGenerator::new(llm.clone(), config.filter_model.clone()),
            summarizer: SummaryGenerator::new(llm.clone(), config.summary_model.clone()),
            answerer: FinalAnswerGenerator::new(llm, config.answer_model.clone()),
        }
    }

    /// Answer one question about the register.
    ///
    /// Dispatch rules, in order:
    /// - `filter_data`: generate a filter, validate it, apply it to a copy.
    /// - `summarise_risks`: summarise the filtered subset if one exists,
    ///   otherwise the whole register.
    /// - `other`: write the final answer from the question plus whatever
    ///   the earlier stages produced. Raw rows are passed along only when
    ///   no summary was written; a summary supersedes them.
    pub async fn run(&self, query: &str, register: &RiskRegister) -> Result<QueryOutcome> {
        let query_id = Uuid::now_v7();
        tracing::info!(query_id = %query_id, rows = register.len(), "query received");
        tracing::debug!(query_id = %query_id, query = %query, "query text");

        let intents = self.classifier.classify(query).await?;
        tracing::info!(query_id = %query_id, intents = %intents, "intents classified");

        let mut filtered: Option<RiskRegister> = None;
        let mut filter_explanation: Option<String> = None;
        if intents.contains(IntentLabel::FilterData) {
            let generated = self.filterer.generate(query).await?;
            let subset = register.filtered(&generated.expr)?;
            tracing::info!(
                query_id = %query_id,
                matched = subset.len(),
                explanation = %generated.explanation,
                "filter applied"
            );
            filtered = Some(subset);
            filter_explanation = Some(generated.explanation);
        }

        let mut summary: Option<String> = None;
        if intents.contains(IntentLabel::SummariseRisks) {
            let data = filtered.as_ref().unwrap_or(register);
            summary = Some(
                self.summarizer
                    .summarize(query, data, filter_explanation.as_deref(), &intents)
                    .await?,
            );
        }

        let mut final_answer: Option<String> = None;
        if intents.contains(IntentLabel::Other) {
            let rows_for_answer = if summary.is_some() {
                None
            } else {
                filtered.as_ref()
            };
            final_answer = Some(
                self.answerer
                    .answer(
                        query,
                        summary.as_deref(),
                        filter_explanation.as_deref(),
                        rows_for_answer,
                    )
                    .await?,
            );
        }

        tracing::info!(query_id = %query_id, "query complete");
        Ok(QueryOutcome {
            intents,
            filtered,
            filter_explanation,
            summary,
            final_answer,
        })
    }
}
