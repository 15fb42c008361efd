//! Pipeline Errors
//!
//! Stage-tagged failure taxonomy for one run.

use crate::media::{ProbeError, SegmentError, ValidationError};
use crate::summarization::SummarizationError;
use crate::transcription::TranscriptionError;
use thiserror::Error;

/// Any failure that ends a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("upload failed: {0}")]
    Upload(std::io::Error),

    #[error("media probing failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("segmentation failed: {0}")]
    Segment(#[from] SegmentError),

    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizationError),
}

impl PipelineError {
    /// Name of the stage that produced the error
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Upload(_) => "upload",
            PipelineError::Probe(_) => "probing",
            PipelineError::Segment(_) => "segmenting",
            PipelineError::Transcription(_) => "transcribing",
            PipelineError::Summarization(_) => "summarizing",
        }
    }
}
