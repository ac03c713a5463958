//! Model plumbing: wire types, the chat trait and the HTTP client.

pub mod client;
pub mod types;

pub use client::{LlmClient, LlmClientConfig};
pub use types::{ChatRequest, Message, Role};

use async_trait::async_trait;

use crate::error::Result;

/// A chat completions backend.
///
/// The pipeline stages talk to the model exclusively through this trait:
/// production wires in [`LlmClient`], tests substitute a scripted double
/// that replays canned replies and records every request it saw.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send one request and return the assistant's complete text reply.
    async fn chat(&self, request: &ChatRequest) -> Result<String>;
}
