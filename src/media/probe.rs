//! Media Probing
//!
//! Duration inspection via an external ffprobe process.

use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

/// Probing errors
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run media probe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("media probe failed: {0}")]
    Tool(String),

    #[error("media probe printed a non-numeric duration: {0:?}")]
    BadOutput(String),
}

/// Duration oracle backed by ffprobe
#[derive(Debug, Clone)]
pub struct MediaProbe {
    bin: String,
}

impl MediaProbe {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Total duration of the input in seconds.
    ///
    /// Expects the tool to print a plain floating-point number on stdout.
    pub async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let output = Command::new(&self.bin)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ProbeError::Tool(stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        let seconds: f64 = text
            .parse()
            .map_err(|_| ProbeError::BadOutput(text.to_string()))?;

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ProbeError::BadOutput(text.to_string()));
        }

        tracing::debug!("probed duration of {:?}: {:.3}s", path, seconds);
        Ok(seconds)
    }
}
