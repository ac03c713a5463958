//! API key resolution.
//!
//! The key is looked up in two places, in order: the `OPENAI_API_KEY`
//! environment variable (a `.env` file in the working directory is loaded
//! first, for local development), then a TOML secrets file. Missing in both
//! places is fatal; the pipeline never starts without a key. A secrets file
//! that exists but cannot be parsed is a configuration error, not a silent
//! fall-through.

use std::path::Path;

use crate::error::{AgentError, Result};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Secrets file consulted when the variable is unset.
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Resolve the API key, or fail naming everywhere that was searched.
pub fn resolve_api_key(secrets_path: Option<&Path>) -> Result<String> {
    // Pull in a local .env if there is one; absence is not an error.
    let _ = dotenvy::dotenv();

    if let Ok(key) = std::env::var(API_KEY_VAR)
        && !key.trim().is_empty()
    {
        tracing::debug!(source = "environment", "API key resolved");
        return Ok(key);
    }

    let path = secrets_path.unwrap_or(Path::new(DEFAULT_SECRETS_FILE));
    if path.exists()
        && let Some(key) = read_secrets_file(path)?
    {
        tracing::debug!(source = %path.display(), "API key resolved");
        return Ok(key);
    }

    Err(AgentError::MissingApiKey {
        reason: format!(
            "{API_KEY_VAR} is not set and {} has no usable key",
            path.display()
        ),
    })
}

/// Read the key from a TOML secrets file shaped like
/// `OPENAI_API_KEY = "sk-..."`. Returns `None` when the file parses but
/// carries no usable key.
fn read_secrets_file(path: &Path) -> Result<Option<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| AgentError::ConfigError {
        reason: format!("failed to read secrets file {}: {e}", path.display()),
    })?;
    let value: toml::Value = toml::from_str(&text).map_err(|e| AgentError::ConfigError {
        reason: format!("invalid secrets file {}: {e}", path.display()),
    })?;
    Ok(value
        .get(API_KEY_VAR)
        .and_then(toml::Value::as_str)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_owned))
}
