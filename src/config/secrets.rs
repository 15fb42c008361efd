//! API Credentials
//!
//! Reads service credentials from the environment. Keys are never written to
//! the settings file or to logs.

use thiserror::Error;

const API_KEY_ENV: &str = "AUTOMINUTES_API_KEY";
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Errors related to credential lookup
#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("API key not found: set AUTOMINUTES_API_KEY or OPENAI_API_KEY")]
    NotFound,

    #[error("Invalid API key format: {0}")]
    InvalidFormat(String),
}

/// Resolves API keys for the remote services
pub struct SecretsManager;

impl SecretsManager {
    /// Retrieve the API key, preferring the tool-specific variable
    pub fn api_key() -> Result<String, SecretsError> {
        let key = std::env::var(API_KEY_ENV)
            .or_else(|_| std::env::var(OPENAI_API_KEY_ENV))
            .map_err(|_| SecretsError::NotFound)?;

        let key = key.trim().to_string();
        Self::validate_api_key(&key)?;
        Ok(key)
    }

    /// Check if an API key is available in the environment
    pub fn has_api_key() -> bool {
        Self::api_key().is_ok()
    }

    /// Validate API key shape without revealing it
    pub fn validate_api_key(api_key: &str) -> Result<(), SecretsError> {
        let api_key = api_key.trim();

        // Generous upper bound; real keys are well under this
        const MAX_API_KEY_LENGTH: usize = 256;

        if api_key.is_empty() {
            return Err(SecretsError::InvalidFormat(
                "API key cannot be empty".to_string(),
            ));
        }

        if api_key.len() > MAX_API_KEY_LENGTH {
            return Err(SecretsError::InvalidFormat(format!(
                "API key is too long (max {} characters)",
                MAX_API_KEY_LENGTH
            )));
        }

        if api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SecretsError::InvalidFormat(
                "API key must not contain whitespace".to_string(),
            ));
        }

        Ok(())
    }
}
