//! OpenAI API request/response types
//!
//! These types match the OpenAI Chat Completions API format exactly.
//! API Documentation: https://platform.openai.com/docs/api-reference/chat/create

use serde::{Deserialize, Serialize};

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// OpenAI Chat Completion Request
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    /// Model ID (e.g. "gpt-4o")
    pub model: String,
    /// Array of messages in the conversation
    pub messages: Vec<OpenAiMessage>,
    /// Sampling temperature (0.0-2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Message in OpenAI format
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// OpenAI Chat Completion Response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponse {
    /// Model used for generation
    pub model: String,
    /// Array of completion choices
    pub choices: Vec<OpenAiChoice>,
    /// Token usage statistics
    pub usage: OpenAiUsage,
}

/// A single choice in the response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    /// The generated message
    pub message: OpenAiResponseMessage,
    /// Reason for stopping ("stop", "length", "content_filter", ...)
    pub finish_reason: Option<String>,
}

/// Response message from the assistant
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponseMessage {
    /// Generated content
    pub content: String,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
