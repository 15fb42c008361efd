//! Remote Summarization Client
//!
//! One chat-completions round trip per run.

use super::{minutes_user_prompt, MINUTES_SYSTEM};
use crate::config::SummarizationSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Summarization errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SummarizationError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Summarization failed: {0}")]
    Failed(String),
}

/// Trait for summarization providers
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Turn a full transcript into a minutes document
    async fn summarize(&self, transcript: &str) -> Result<String, SummarizationError>;

    /// Get provider name
    fn name(&self) -> &'static str;
}

// OpenAI-compatible chat request/response
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// OpenAI-compatible summarization provider
pub struct OpenAiSummarizer {
    endpoint: String,
    model: String,
    language: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
    max_retries: u32,
}

impl OpenAiSummarizer {
    /// Create a provider with default endpoint, model and timeout
    pub fn new(api_key: String) -> Self {
        Self::from_settings(&SummarizationSettings::default(), api_key)
    }

    /// Create a provider from settings
    pub fn from_settings(settings: &SummarizationSettings, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            language: settings.language.clone(),
            api_key,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            client,
            max_retries: settings.max_retries,
        }
    }

    /// Calculate delay for retry with exponential backoff
    fn retry_delay(attempt: u32) -> Duration {
        let delay_ms = RETRY_BASE_DELAY_MS * 2u64.pow(attempt);
        Duration::from_millis(delay_ms.min(30_000))
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String, SummarizationError> {
        if self.api_key.is_empty() {
            return Err(SummarizationError::MissingApiKey);
        }

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: MINUTES_SYSTEM.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: minutes_user_prompt(transcript, &self.language),
                },
            ],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        };

        let mut last_error: Option<SummarizationError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Self::retry_delay(attempt - 1);
                tracing::info!(
                    "Retrying summarization request (attempt {}/{}) after {:?}",
                    attempt + 1,
                    self.max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!("summarization network error: {}", e);
                    last_error = Some(SummarizationError::NetworkError(e.to_string()));
                    continue;
                }
            };

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("summarization endpoint rate limited");
                last_error = Some(SummarizationError::RateLimited);
                continue;
            }

            if response.status().is_server_error() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Server error".to_string());
                tracing::warn!("summarization server error: {}", error_text);
                last_error = Some(SummarizationError::NetworkError(error_text));
                continue;
            }

            if !response.status().is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(SummarizationError::ApiError(error_text));
            }

            // A minutes document the caller never sees is worse than a hard
            // error, so a 2xx that does not parse is a failure here (unlike
            // the lenient transcription path)
            let parsed: ChatResponse = match response.json().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    return Err(SummarizationError::Failed(format!(
                        "unparsable response: {}",
                        e
                    )));
                }
            };

            let content = parsed
                .choices
                .first()
                .map(|choice| choice.message.content.clone())
                .ok_or_else(|| SummarizationError::Failed("response had no choices".to_string()))?;

            if attempt > 0 {
                tracing::info!("summarization request succeeded after {} retries", attempt);
            }

            return Ok(content);
        }

        Err(last_error
            .unwrap_or_else(|| SummarizationError::Failed("All retry attempts failed".to_string())))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
