//! Completion-service client
//!
//! Unified request/response types plus the OpenAI provider. The pipeline
//! only uses `complete(system, user)`: a single-turn, temperature-0 chat
//! completion returning the raw text (extraction and validation both feed
//! accounting logic, so outputs must be deterministic-leaning).

pub mod openai;
mod types;

pub use types::{ChatMessage, ChatRequest, ChatResponse, LlmError, MessageRole, Usage};

use crate::config::with_config;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use openai::OpenAiClient;
use std::sync::Arc;

/// Common interface for completion providers
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name for logging
    fn provider(&self) -> &'static str;

    /// Whether the provider is configured and usable
    fn is_enabled(&self) -> bool;

    /// Execute a chat completion
    async fn call(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// Global completion client, built lazily from config
static LLM_CLIENT: OnceCell<Arc<dyn LlmClient>> = OnceCell::new();

/// Get the global completion client
pub fn get_llm_client() -> Arc<dyn LlmClient> {
    LLM_CLIENT
        .get_or_init(|| {
            let (api_key, model, timeout_secs) =
                with_config(|c| (c.llm.api_key.clone(), c.llm.model.clone(), c.llm.timeout_secs));
            Arc::new(OpenAiClient::new(api_key, model, timeout_secs))
        })
        .clone()
}

/// Single-turn completion at temperature 0 against a specific client
///
/// Builds the request from config (model, temperature, max_tokens) and
/// returns the assistant text. The extractor, backfill searcher and
/// validator all go through here.
pub async fn complete_with(
    client: &dyn LlmClient,
    system: &str,
    user: &str,
) -> Result<String, LlmError> {
    let (model, temperature, max_tokens) =
        with_config(|c| (c.llm.model.clone(), c.llm.temperature, c.llm.max_tokens));

    let request = ChatRequest::new(
        model,
        vec![ChatMessage::system(system), ChatMessage::user(user)],
    )
    .with_temperature(temperature)
    .with_max_tokens(max_tokens);

    let response = client.call(request).await?;
    Ok(response.content)
}
