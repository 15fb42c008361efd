//! Minutes Service
//!
//! Centralized orchestration of one upload cycle: validate, persist, segment,
//! transcribe per segment, join, summarize. Holds the single active RunState
//! for front ends to poll.

use super::{PipelineError, RunStage, RunState};
use crate::config::{SecretsError, SecretsManager, Settings};
use crate::media::{validate_extension, MediaProbe, Segment, Segmenter};
use crate::summarization::{OpenAiSummarizer, Summarizer};
use crate::transcription::{OpenAiTranscriber, SpeechToText, TranscriptionRequest};
use parking_lot::RwLock;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

/// Fragments are joined in ordinal order with this separator
pub const TRANSCRIPT_SEPARATOR: &str = "\n";

/// Orchestrates the minutes pipeline and owns the active run's state
pub struct MinutesService {
    probe: MediaProbe,
    segmenter: Segmenter,
    transcriber: Box<dyn SpeechToText>,
    summarizer: Box<dyn Summarizer>,
    chunk_secs: u64,
    language: String,
    state: RwLock<RunState>,
    /// Serializes runs: a new upload is not accepted until the current run
    /// reaches a terminal stage
    run_guard: tokio::sync::Mutex<()>,
}

impl MinutesService {
    /// Create a service wired to the remote providers from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, SecretsError> {
        let api_key = SecretsManager::api_key()?;

        Ok(Self::with_components(
            MediaProbe::new(&settings.media.ffprobe_bin),
            Segmenter::new(&settings.media.ffmpeg_bin, settings.media.split_mode),
            Box::new(OpenAiTranscriber::from_settings(
                &settings.transcription,
                api_key.clone(),
            )),
            Box::new(OpenAiSummarizer::from_settings(
                &settings.summarization,
                api_key,
            )),
            settings.media.chunk_secs,
            settings.transcription.language.clone(),
        ))
    }

    /// Create a service from explicit components
    pub fn with_components(
        probe: MediaProbe,
        segmenter: Segmenter,
        transcriber: Box<dyn SpeechToText>,
        summarizer: Box<dyn Summarizer>,
        chunk_secs: u64,
        language: String,
    ) -> Self {
        Self {
            probe,
            segmenter,
            transcriber,
            summarizer,
            chunk_secs,
            language,
            state: RwLock::new(RunState::default()),
            run_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Snapshot of the current run state
    pub fn state(&self) -> RunState {
        self.state.read().clone()
    }

    /// "Start new run": clear the previous outcome and return to Idle
    pub fn reset(&self) {
        *self.state.write() = RunState::default();
    }

    /// Process one upload to completion or failure and return the outcome.
    ///
    /// A service already in a terminal stage returns its state unchanged;
    /// the caller must [`reset`](Self::reset) first.
    pub async fn run(&self, bytes: &[u8], filename: &str) -> RunState {
        let _guard = self.run_guard.lock().await;

        if self.state.read().stage.is_terminal() {
            tracing::warn!("run requested while a finished run is displayed; reset first");
            return self.state();
        }

        self.state.write().run_id = Uuid::new_v4();
        tracing::info!("processing upload {:?} ({} bytes)", filename, bytes.len());

        if let Err(error) = self.execute(bytes, filename).await {
            tracing::error!("run failed while {}: {}", error.stage(), error);
            let mut state = self.state.write();
            state.stage = RunStage::Errored;
            state.error = Some(error.to_string());
        }

        self.state()
    }

    async fn execute(&self, bytes: &[u8], filename: &str) -> Result<(), PipelineError> {
        // Validation precedes any filesystem or subprocess work
        let ext = validate_extension(filename)?;

        self.set_stage(RunStage::Uploading);
        let workdir = TempDir::new().map_err(PipelineError::Upload)?;
        let upload_path = workdir.path().join(format!("upload.{}", ext));
        tokio::fs::write(&upload_path, bytes)
            .await
            .map_err(PipelineError::Upload)?;

        // The uploaded temp file is removed exactly once, whether
        // segmentation succeeds or not
        self.set_stage(RunStage::Segmenting);
        let segments = {
            let outcome = self.segment_stage(&upload_path, workdir.path()).await;
            if let Err(e) = tokio::fs::remove_file(&upload_path).await {
                tracing::warn!("failed to remove uploaded temp file: {}", e);
            }
            outcome?
        };

        let transcript = self.transcribe_stage(&segments).await?;

        self.set_stage(RunStage::Summarizing);
        let summary = self.summarizer.summarize(&transcript).await?;
        tracing::info!("minutes generated ({} chars)", summary.len());

        let mut state = self.state.write();
        state.summary = Some(summary);
        state.stage = RunStage::Done;
        Ok(())
        // workdir drops here, removing any segment files past a failure point
    }

    async fn segment_stage(
        &self,
        upload: &Path,
        out_dir: &Path,
    ) -> Result<Vec<Segment>, PipelineError> {
        let duration = self.probe.probe_duration(upload).await?;
        tracing::info!(
            "input duration {:.1}s, chunk length {}s",
            duration,
            self.chunk_secs
        );

        Ok(self
            .segmenter
            .split(upload, duration, self.chunk_secs, out_dir)
            .await?)
    }

    /// Transcribe strictly in ordinal order; each segment file is deleted
    /// right after its attempt, then the fragments are joined
    async fn transcribe_stage(&self, segments: &[Segment]) -> Result<String, PipelineError> {
        let total = segments.len();
        let request = TranscriptionRequest {
            language: self.language.clone(),
        };

        let mut fragments = Vec::with_capacity(total);
        for segment in segments {
            self.set_stage(RunStage::Transcribing {
                done: segment.index,
                total,
            });

            let result = self
                .transcriber
                .transcribe_file(&segment.path, &request)
                .await;
            if let Err(e) = tokio::fs::remove_file(&segment.path).await {
                tracing::warn!("failed to remove segment file {:?}: {}", segment.path, e);
            }

            let text = result?;
            tracing::info!(
                "segment {}/{} transcribed ({} chars) by {}",
                segment.index + 1,
                total,
                text.len(),
                self.transcriber.name()
            );
            fragments.push(text);
        }

        self.set_stage(RunStage::Joining);
        let transcript = fragments.join(TRANSCRIPT_SEPARATOR);

        // Durable before summarization is attempted
        self.state.write().transcript = Some(transcript.clone());
        Ok(transcript)
    }

    fn set_stage(&self, stage: RunStage) {
        self.state.write().stage = stage;
    }
}
