//! Transcription Provider Trait
//!
//! Common interface for speech-to-text backends.

use async_trait::async_trait;
use std::path::Path;

/// Per-request transcription parameters
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    /// Language code (ISO 639-1) the recording is expected to be in
    pub language: String,
}

impl Default for TranscriptionRequest {
    fn default() -> Self {
        Self {
            language: "id".to_string(),
        }
    }
}

/// Transcription errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranscriptionError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Transcription failed: {0}")]
    Failed(String),
}

/// Trait for transcription providers
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe one audio file to text
    async fn transcribe_file(
        &self,
        path: &Path,
        request: &TranscriptionRequest,
    ) -> Result<String, TranscriptionError>;

    /// Get provider name
    fn name(&self) -> &'static str;
}
