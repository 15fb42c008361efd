//! Audio Format Support
//!
//! The upload formats accepted by the transcription service, and filename
//! validation against them.

use thiserror::Error;

/// Container/codec formats the remote transcription service accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 10] = [
    "flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "oga", "ogg", "wav", "webm",
];

/// Upload validation errors
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("unsupported audio format: .{0}; supported formats: {formats}", formats = supported_formats())]
    UnsupportedFormat(String),
}

/// Comma-separated list of accepted extensions, for user-facing messages
pub fn supported_formats() -> String {
    SUPPORTED_EXTENSIONS.join(", ")
}

/// Validate a declared filename and return its lowercased extension.
///
/// The match is a case-insensitive suffix check; a name without a dot is
/// treated as its own extension and rejected.
pub fn validate_extension(filename: &str) -> Result<String, ValidationError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(filename)
        .to_ascii_lowercase();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ValidationError::UnsupportedFormat(ext))
    }
}

/// MIME type for a supported extension, for multipart upload parts
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "flac" => "audio/flac",
        "m4a" | "mp4" => "audio/mp4",
        "mp3" | "mpeg" | "mpga" => "audio/mpeg",
        "oga" | "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}
