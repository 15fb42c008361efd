//! Audio Segmentation
//!
//! Splits a long recording into bounded-length segment files with ffmpeg.
//! Segments are materialized by stream copy by default; see [`SplitMode`].

use crate::config::SplitMode;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// One bounded-length piece of the uploaded recording
#[derive(Debug, Clone)]
pub struct Segment {
    /// 0-based ordinal; transcripts are joined in this order
    pub index: usize,
    /// Offset into the source, in seconds
    pub start_secs: f64,
    /// Requested length in seconds; the final segment is truncated at
    /// end-of-stream by the media tool
    pub duration_secs: f64,
    /// Backing temporary file
    pub path: PathBuf,
}

/// Segmentation errors
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("chunk length must be positive, got {0}")]
    InvalidChunkLength(u64),

    #[error("failed to run media splitter: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("media splitter failed on segment {index}: {stderr}")]
    Tool { index: usize, stderr: String },
}

/// Start offsets for a recording of `duration_secs` cut into `chunk_secs`
/// pieces: `floor(duration / chunk) + 1` parts, part `i` starting at
/// `i * chunk`.
pub fn plan_offsets(duration_secs: f64, chunk_secs: u64) -> Vec<f64> {
    let parts = if chunk_secs == 0 {
        1
    } else {
        (duration_secs / chunk_secs as f64).floor() as usize + 1
    };
    (0..parts).map(|i| (i as u64 * chunk_secs) as f64).collect()
}

/// Materializes segments with an external ffmpeg process
#[derive(Debug, Clone)]
pub struct Segmenter {
    bin: String,
    mode: SplitMode,
}

impl Segmenter {
    pub fn new(bin: impl Into<String>, mode: SplitMode) -> Self {
        Self {
            bin: bin.into(),
            mode,
        }
    }

    /// Cut `input` into `floor(duration/chunk) + 1` independent segment files
    /// under `out_dir`.
    ///
    /// A partially completed split removes the files it already produced
    /// before the error propagates.
    pub async fn split(
        &self,
        input: &Path,
        duration_secs: f64,
        chunk_secs: u64,
        out_dir: &Path,
    ) -> Result<Vec<Segment>, SegmentError> {
        if chunk_secs == 0 {
            return Err(SegmentError::InvalidChunkLength(chunk_secs));
        }

        let ext = input
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        let offsets = plan_offsets(duration_secs, chunk_secs);
        tracing::info!(
            "splitting {:?} ({:.1}s) into {} segment(s) of {}s",
            input,
            duration_secs,
            offsets.len(),
            chunk_secs
        );

        let mut segments: Vec<Segment> = Vec::with_capacity(offsets.len());
        for (index, start_secs) in offsets.into_iter().enumerate() {
            let path = out_dir.join(format!("segment-{:03}.{}", index, ext));

            let mut cmd = Command::new(&self.bin);
            cmd.args(["-y", "-v", "error"])
                .args(["-ss", &start_secs.to_string()])
                .args(["-t", &chunk_secs.to_string()])
                .arg("-i")
                .arg(input);
            if self.mode == SplitMode::Copy {
                cmd.args(["-c", "copy"]);
            }
            cmd.arg(&path);

            let output = match cmd.output().await {
                Ok(output) => output,
                Err(e) => {
                    Self::cleanup(&segments, &path).await;
                    return Err(SegmentError::Spawn(e));
                }
            };

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                Self::cleanup(&segments, &path).await;
                return Err(SegmentError::Tool { index, stderr });
            }

            segments.push(Segment {
                index,
                start_secs,
                duration_secs: chunk_secs as f64,
                path,
            });
        }

        Ok(segments)
    }

    /// Remove already-produced files from a partially completed split
    async fn cleanup(done: &[Segment], partial: &Path) {
        for segment in done {
            if let Err(e) = tokio::fs::remove_file(&segment.path).await {
                tracing::warn!("failed to remove segment file {:?}: {}", segment.path, e);
            }
        }
        let _ = tokio::fs::remove_file(partial).await;
    }
}
