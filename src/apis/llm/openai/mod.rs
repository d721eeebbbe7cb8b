//! OpenAI API client (raw HTTP via reqwest)
//!
//! Endpoints:
//! - POST https://api.openai.com/v1/chat/completions

mod types;

use self::types::{OpenAiMessage, OpenAiRequest, OpenAiResponse};
use crate::apis::llm::{ChatRequest, ChatResponse, LlmClient, LlmError, Usage};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

// ============================================================================
// API CONFIGURATION
// ============================================================================

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ENDPOINT_CHAT: &str = "/chat/completions";

/// OpenAI API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    timeout: Duration,
    enabled: bool,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    ///
    /// An empty API key leaves the client disabled; every call returns
    /// `LlmError::ProviderDisabled`.
    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Self {
        let enabled = !api_key.is_empty();
        Self {
            client: Client::new(),
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
            enabled,
        }
    }

    /// Convert the unified ChatRequest to OpenAI wire format
    fn build_openai_request(&self, request: ChatRequest) -> OpenAiRequest {
        let messages = request
            .messages
            .into_iter()
            .map(|msg| OpenAiMessage {
                role: msg.role.to_string(),
                content: msg.content,
            })
            .collect();

        OpenAiRequest {
            model: request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert the OpenAI response to the unified ChatResponse
    fn parse_openai_response(
        &self,
        response: OpenAiResponse,
        latency_ms: f64,
    ) -> Result<ChatResponse, LlmError> {
        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: "openai".to_string(),
                message: "No choices in response".to_string(),
            })?;

        Ok(ChatResponse {
            content: choice.message.content.clone(),
            usage: Usage::new(
                response.usage.prompt_tokens,
                response.usage.completion_tokens,
            ),
            finish_reason: choice
                .finish_reason
                .clone()
                .unwrap_or_else(|| "stop".to_string()),
            model: response.model,
            latency_ms,
        })
    }

    /// Execute the API call
    async fn execute_request(
        &self,
        request: OpenAiRequest,
    ) -> Result<(OpenAiResponse, f64), LlmError> {
        let url = format!("{}{}", OPENAI_BASE_URL, ENDPOINT_CHAT);

        logger::debug(
            LogTag::Llm,
            &format!("[OPENAI] Calling chat completions: model={}", request.model),
        );

        let start = Instant::now();
        let response_result = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await;
        let elapsed = start.elapsed().as_millis() as f64;

        let response = response_result.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    provider: "openai".to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                LlmError::NetworkError {
                    provider: "openai".to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            // Parse retry-after header BEFORE consuming the body
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|s| s * 1000);

            let error_body = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 => LlmError::AuthError {
                    provider: "openai".to_string(),
                    message: "Invalid API key".to_string(),
                },
                429 => LlmError::RateLimited {
                    provider: "openai".to_string(),
                    retry_after_ms: retry_after,
                },
                _ => LlmError::ApiError {
                    provider: "openai".to_string(),
                    status_code: status.as_u16(),
                    message: error_body,
                },
            });
        }

        let openai_response =
            response
                .json::<OpenAiResponse>()
                .await
                .map_err(|e| LlmError::ParseError {
                    provider: "openai".to_string(),
                    message: format!("Failed to parse response: {}", e),
                })?;

        Ok((openai_response, elapsed))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> &'static str {
        "openai"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn call(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        if !self.enabled {
            return Err(LlmError::ProviderDisabled {
                provider: "openai".to_string(),
            });
        }

        let mut request = request;
        if request.model.is_empty() {
            request.model = self.model.clone();
        }

        let openai_request = self.build_openai_request(request);
        let (openai_response, latency_ms) = self.execute_request(openai_request).await?;

        logger::debug(
            LogTag::Llm,
            &format!(
                "[OPENAI] Completed: tokens={} latency={:.0}ms",
                openai_response.usage.total_tokens, latency_ms
            ),
        );

        self.parse_openai_response(openai_response, latency_ms)
    }
}
