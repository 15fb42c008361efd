//! Settings Definition
//!
//! Pipeline configuration schema.

use serde::{Deserialize, Serialize};

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub media: MediaSettings,
    pub transcription: TranscriptionSettings,
    pub summarization: SummarizationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            media: MediaSettings::default(),
            transcription: TranscriptionSettings::default(),
            summarization: SummarizationSettings::default(),
        }
    }
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.media.chunk_secs == 0 {
            return Err(SettingsError::InvalidChunkLength(self.media.chunk_secs));
        }

        let temp = self.summarization.temperature;
        if !(0.0..=2.0).contains(&temp) || !temp.is_finite() {
            return Err(SettingsError::InvalidTemperature(temp));
        }

        Ok(())
    }

    /// Load settings from the per-user config location
    pub fn load() -> Result<Self, SettingsError> {
        super::store::load_settings()
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<(), SettingsError> {
        super::store::save_settings(self)
    }
}

/// External media tool and segmentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// ffmpeg binary name or path
    pub ffmpeg_bin: String,
    /// ffprobe binary name or path
    pub ffprobe_bin: String,
    /// Segment length in seconds
    pub chunk_secs: u64,
    /// How segment files are materialized
    pub split_mode: SplitMode,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            chunk_secs: 300, // 5 minutes
            split_mode: SplitMode::Copy,
        }
    }
}

/// Segment materialization mode
///
/// Stream copy is fast and lossless but can produce unplayable standalone
/// files for containers whose streams are not self-contained; re-encoding is
/// slower but always yields valid segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    Copy,
    Reencode,
}

/// Remote speech-to-text settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Transcription endpoint (OpenAI-compatible `audio/transcriptions`)
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// Language code (ISO 639-1) the recordings are expected to be in
    pub language: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Retry attempts after the first failure (0 = fail immediately)
    pub max_retries: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/audio/transcriptions".to_string(),
            model: "whisper-1".to_string(),
            language: "id".to_string(),
            timeout_seconds: 120,
            max_retries: 0,
        }
    }
}

/// Remote summarization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    /// Summarization endpoint (OpenAI-compatible `chat/completions`)
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// Language the minutes are written in
    pub language: String,
    /// Sampling temperature; kept low for deterministic minutes
    pub temperature: f32,
    /// Response token cap
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Retry attempts after the first failure (0 = fail immediately)
    pub max_retries: u32,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            language: "Indonesian".to_string(),
            temperature: 0.4,
            max_tokens: 1024,
            timeout_seconds: 60,
            max_retries: 0,
        }
    }
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("chunk length must be positive, got {0}")]
    InvalidChunkLength(u64),

    #[error("temperature out of range [0, 2]: {0}")]
    InvalidTemperature(f32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),
}
