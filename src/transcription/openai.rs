//! Remote Transcription Client
//!
//! Cloud transcription via an OpenAI-compatible `audio/transcriptions`
//! endpoint.

use super::{SpeechToText, TranscriptionError, TranscriptionRequest};
use crate::config::TranscriptionSettings;
use crate::media::mime_for_extension;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/audio/transcriptions";
const DEFAULT_MODEL: &str = "whisper-1";
const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// OpenAI-compatible transcription provider
pub struct OpenAiTranscriber {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
}

impl OpenAiTranscriber {
    /// Create a provider with default endpoint, model and timeout
    pub fn new(api_key: String) -> Self {
        Self::with_config(
            api_key,
            DEFAULT_ENDPOINT,
            DEFAULT_MODEL,
            DEFAULT_TIMEOUT_SECONDS,
            0,
        )
    }

    /// Create a provider with full configuration
    pub fn with_config(
        api_key: String,
        endpoint: &str,
        model: &str,
        timeout_seconds: u64,
        max_retries: u32,
    ) -> Self {
        let timeout = Duration::from_secs(timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key,
            client,
            timeout,
            max_retries,
        }
    }

    /// Create a provider from settings
    pub fn from_settings(settings: &TranscriptionSettings, api_key: String) -> Self {
        Self::with_config(
            api_key,
            &settings.endpoint,
            &settings.model,
            settings.timeout_seconds,
            settings.max_retries,
        )
    }

    /// Get the current timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the max retries
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Calculate delay for retry with exponential backoff
    fn retry_delay(attempt: u32) -> Duration {
        let delay_ms = RETRY_BASE_DELAY_MS * 2u64.pow(attempt);
        Duration::from_millis(delay_ms.min(30_000)) // Cap at 30 seconds
    }
}

#[async_trait]
impl SpeechToText for OpenAiTranscriber {
    async fn transcribe_file(
        &self,
        path: &Path,
        request: &TranscriptionRequest,
    ) -> Result<String, TranscriptionError> {
        if self.api_key.is_empty() {
            return Err(TranscriptionError::MissingApiKey);
        }

        // Read once, reused across retries
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TranscriptionError::InvalidAudio(format!("{:?}: {}", path, e)))?;

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.bin")
            .to_string();
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin")
            .to_ascii_lowercase();

        let mut last_error: Option<TranscriptionError> = None;

        // Retry loop with exponential backoff; the default retry count is 0,
        // which fails the run on the first transport error
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Self::retry_delay(attempt - 1);
                tracing::info!(
                    "Retrying transcription request (attempt {}/{}) after {:?}",
                    attempt + 1,
                    self.max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            // Build multipart form (must be rebuilt for each attempt)
            let file_part = match reqwest::multipart::Part::bytes(bytes.clone())
                .file_name(file_name.clone())
                .mime_str(mime_for_extension(&ext))
            {
                Ok(part) => part,
                Err(e) => return Err(TranscriptionError::Failed(e.to_string())),
            };

            let form = reqwest::multipart::Form::new()
                .part("file", file_part)
                .text("model", self.model.clone())
                .text("language", request.language.clone())
                .text("response_format", "json");

            // Make API request
            let response = match self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .multipart(form)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!("transcription network error: {}", e);
                    last_error = Some(TranscriptionError::NetworkError(e.to_string()));
                    continue;
                }
            };

            // Rate limiting (retryable)
            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("transcription endpoint rate limited");
                last_error = Some(TranscriptionError::RateLimited);
                continue;
            }

            // Server errors (5xx - retryable)
            if response.status().is_server_error() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Server error".to_string());
                tracing::warn!("transcription server error: {}", error_text);
                last_error = Some(TranscriptionError::NetworkError(error_text));
                continue;
            }

            // Client errors (4xx - not retryable except rate limit)
            if !response.status().is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(TranscriptionError::ApiError(error_text));
            }

            // A 2xx with an empty or malformed body counts as an empty
            // transcript, not an error
            let body = response.text().await.unwrap_or_default();
            let text = serde_json::from_str::<TranscriptionResponse>(&body)
                .map(|parsed| parsed.text)
                .unwrap_or_default();

            if attempt > 0 {
                tracing::info!("transcription request succeeded after {} retries", attempt);
            }

            return Ok(text.trim().to_string());
        }

        // All retries exhausted
        Err(last_error
            .unwrap_or_else(|| TranscriptionError::Failed("All retry attempts failed".to_string())))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Transcription API response
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}
