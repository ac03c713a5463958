//! LLM query pipeline for RiskLens.
//!
//! This crate turns a natural-language question about the risk register
//! into a structured outcome by chaining small, single-purpose model calls:
//!
//! ```text
//! question ──> IntentClassifier ──> intent set
//!                    │
//!        filter_data ▼
//!             FilterGenerator ──> FilterExpr ──> register.filtered()
//!                    │
//!    summarise_risks ▼
//!             SummaryGenerator   (filtered subset, or the whole register)
//!                    │
//!              other ▼
//!             FinalAnswerGenerator
//! ```
//!
//! Stages that the intent set does not name simply do not run. Every model
//! reply with structure is parsed strictly and validated before anything
//! touches register data; the model proposes, this crate disposes.
//!
//! # Modules
//!
//! - [`llm`] -- wire types, the [`llm::ChatModel`] trait and the HTTP client.
//! - [`intent`] -- intent classification into `filter_data` /
//!   `summarise_risks` / `other`.
//! - [`filter`] -- query-to-filter translation.
//! - [`summary`] -- narrative summarisation of register rows.
//! - [`answer`] -- the final-answer stage.
//! - [`pipeline`] -- orchestration and the [`pipeline::QueryOutcome`].
//! - [`config`] -- per-stage model selection.
//! - [`credentials`] -- API key resolution.
//! - [`error`] -- pipeline error types.

pub mod answer;
pub mod config;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod intent;
pub mod llm;
pub mod pipeline;
pub mod summary;

// Re-export the most commonly used types at the crate root for convenience.
pub use config::PipelineConfig;
pub use error::{AgentError, Result};
pub use intent::{IntentLabel, IntentSet};
pub use llm::{ChatModel, ChatRequest, LlmClient, LlmClientConfig, Message, Role};
pub use pipeline::{Pipeline, QueryOutcome};
