//! Pipeline error types.
//!
//! All pipeline stages surface errors through [`AgentError`]. Each variant
//! carries enough context for callers to decide how to handle the failure;
//! parse failures embed the raw model output so a misbehaving model can be
//! diagnosed from the error alone.

/// Unified error type for the query pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // -- Credentials and configuration ---------------------------------------
    /// No usable API key could be resolved.
    #[error("no API key: {reason}")]
    MissingApiKey { reason: String },

    /// Configuration loading or validation failed.
    #[error("config error: {reason}")]
    ConfigError { reason: String },

    // -- Transport errors ----------------------------------------------------
    /// An HTTP request to the model provider failed.
    #[error("chat request failed: {reason}")]
    RequestFailed { reason: String },

    /// The provider's response envelope was not in the expected shape.
    #[error("malformed chat response: {reason}")]
    MalformedResponse { reason: String },

    // -- Stage errors --------------------------------------------------------
    /// The classifier's reply was not a JSON list of known intent labels.
    #[error("intent classification parse error: {reason}")]
    IntentParseFailed { reason: String },

    /// The filter generator's reply was not a valid filter/explanation pair.
    #[error("filter generation parse error: {reason}")]
    FilterParseFailed { reason: String },

    /// A narrative stage returned an empty reply.
    #[error("{stage} stage returned an empty response")]
    EmptyResponse { stage: String },

    // -- Serialization -------------------------------------------------------
    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    // -- Upstream crate errors -----------------------------------------------
    /// An error propagated from the register data model.
    #[error("register error: {0}")]
    Register(#[from] risklens_core::RegisterError),
}

/// Convenience alias used throughout the pipeline crate.
pub type Result<T> = std::result::Result<T, AgentError>;

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            reason: err.to_string(),
        }
    }
}
