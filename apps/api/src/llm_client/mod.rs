/// LLM Client: the completion gateway used by every analysis and enhancement task.
///
/// ARCHITECTURAL RULE: orchestrators never talk to a provider directly. They receive
/// an `Arc<dyn CompletionGateway>` and only see `CompletionRequest` / `CompletionResponse`.
///
/// Retry policy lives here and only here. Callers treat every failure (timeouts included)
/// as a single `CompletionError`.
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod scripted;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Default model when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Completion returned empty content")]
    EmptyContent,

    #[error("Completion service is not configured")]
    Unavailable,
}

/// One task's request: the prompt plus its generation options.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens,
        }
    }
}

/// Generated text plus usage/timing metadata. Read-only to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub content: String,
    pub usage_tokens: u32,
    pub model: String,
    pub duration_ms: u64,
}

/// The completion capability consumed by the orchestration core.
///
/// Carried in `AppState` as `Arc<dyn CompletionGateway>` so tests can swap in
/// a scripted double without network access.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    fn is_available(&self) -> bool;

    fn model(&self) -> &str;

    async fn generate_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    model: String,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Extracts the text content from the first text block.
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Anthropic Messages API adapter for `CompletionGateway`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    pub fn new(
        api_key: Option<String>,
        model: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            max_retries,
        })
    }

    /// The first request plus `max_retries` retries.
    fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Doubles from 1s per retry, capped at `MAX_BACKOFF`.
fn backoff_delay(retry: u32) -> Duration {
    let factor = 1u64
        .checked_shl(retry.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(1000u64.saturating_mul(factor)).min(MAX_BACKOFF)
}

#[async_trait]
impl CompletionGateway for LlmClient {
    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn model(&self) -> &str {
        &self.model
    }

    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn generate_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::Unavailable)?;

        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: prompts::RESUME_EXPERT_SYSTEM,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt,
            }],
        };

        let started = Instant::now();
        let mut last_error: Option<CompletionError> = None;

        for attempt in 0..self.attempts() {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Completion attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(CompletionError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Completion API returned {}: {}", status, body);
                last_error = Some(CompletionError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(CompletionError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: AnthropicResponse = serde_json::from_str(&body)?;
            let content = parsed.text().ok_or(CompletionError::EmptyContent)?.to_string();
            let duration_ms = started.elapsed().as_millis() as u64;
            let usage_tokens = parsed.usage.input_tokens + parsed.usage.output_tokens;

            debug!(
                "Completion succeeded in {}ms: prompt_chars={}, response_chars={}, tokens={}",
                duration_ms,
                request.prompt.len(),
                content.len(),
                usage_tokens
            );

            return Ok(CompletionResponse {
                content,
                usage_tokens,
                model: parsed.model,
                duration_ms,
            });
        }

        Err(last_error.unwrap_or(CompletionError::RateLimited {
            retries: self.max_retries,
        }))
    }
}
