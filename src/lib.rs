//! Autominutes Library
//!
//! Core pipeline for turning long meeting recordings into written minutes:
//! ffmpeg-based segmentation, remote speech-to-text per segment, transcript
//! assembly, and LLM summarization.

pub mod config;
pub mod media;
pub mod pipeline;
pub mod summarization;
pub mod transcription;
