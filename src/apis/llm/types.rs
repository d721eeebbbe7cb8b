//! Core LLM API types
//!
//! Unified request/response types; the provider module transforms these
//! to/from its specific wire format.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// MESSAGE TYPES
// ============================================================================

/// Chat message with role and content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Message role in a chat conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g. "gpt-4o")
    pub model: String,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text content
    pub content: String,
    /// Token usage statistics
    pub usage: Usage,
    /// Reason for completion finish
    pub finish_reason: String,
    /// Model used for generation
    pub model: String,
    /// Latency in milliseconds
    pub latency_ms: f64,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// LLM API errors
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("[{provider}] Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited {
        provider: String,
        retry_after_ms: Option<u64>,
    },

    #[error("[{provider}] Request timeout ({timeout_ms}ms)")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("[{provider}] Invalid response: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("[{provider}] Auth error: {message}")]
    AuthError { provider: String, message: String },

    #[error("[{provider}] Network error: {message}")]
    NetworkError { provider: String, message: String },

    #[error("[{provider}] Parse error: {message}")]
    ParseError { provider: String, message: String },

    #[error("[{provider}] API error {status_code}: {message}")]
    ApiError {
        provider: String,
        status_code: u16,
        message: String,
    },

    #[error("[{provider}] Provider disabled in config")]
    ProviderDisabled { provider: String },
}

// Convert to String for compatibility with Result<T, String> service seams
impl From<LlmError> for String {
    fn from(err: LlmError) -> String {
        err.to_string()
    }
}
