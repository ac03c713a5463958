//! Pipeline configuration.
//!
//! Which model serves each stage, and where the endpoint lives. Sampling
//! temperatures are deliberately not configuration: how deterministic each
//! stage must be is part of that stage's contract, not an operator knob.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Per-stage model selection and endpoint configuration.
///
/// Loadable from TOML. Every field has a default, so a config file can
/// override a single model and leave the rest alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// OpenAI-compatible endpoint base URL.
    pub base_url: String,
    /// Model for intent classification. Runs on every query, so the
    /// default is the cheapest model that classifies reliably.
    pub classifier_model: String,
    /// Model for filter generation, the most demanding structured task.
    pub filter_model: String,
    /// Model for summarisation.
    pub summary_model: String,
    /// Model for final answers.
    pub answer_model: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            classifier_model: "gpt-4.1-nano".into(),
            filter_model: "gpt-4.1".into(),
            summary_model: "gpt-4o-mini".into(),
            answer_model: "gpt-4o-mini".into(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AgentError::ConfigError {
            reason: format!("failed to read config {}: {e}", path.display()),
        })?;
        toml::from_str(&text).map_err(|e| AgentError::ConfigError {
            reason: format!("invalid config {}: {e}", path.display()),
        })
    }

    /// `None` means defaults; an explicitly named file must load.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
