//! Integration Tests for the Minutes Pipeline
//!
//! Exercises the full flow: validate -> persist -> segment -> transcribe per
//! segment -> join -> summarize, with stubbed media tools and mock remote
//! providers.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use autominutes::config::SplitMode;
use autominutes::media::{MediaProbe, Segmenter};
use autominutes::pipeline::{MinutesService, RunStage};
use autominutes::summarization::{SummarizationError, Summarizer};
use autominutes::transcription::{SpeechToText, TranscriptionError, TranscriptionRequest};

// ============================================================================
// Test Fixtures: stub media tools and mock remote providers
// ============================================================================

/// Stubbed ffprobe/ffmpeg plus the files they leave behind for assertions
#[cfg(unix)]
struct StubTools {
    probe: MediaProbe,
    segmenter: Segmenter,
    /// Created the first time the probe stub runs
    probe_marker: PathBuf,
    /// One line of arguments per ffmpeg invocation
    splitter_log: PathBuf,
}

#[cfg(unix)]
fn stub_tools(dir: &tempfile::TempDir, duration: &str) -> StubTools {
    use std::os::unix::fs::PermissionsExt;

    let probe_marker = dir.path().join("probe-called");
    let splitter_log = dir.path().join("splitter-args.log");

    let probe_path = dir.path().join("fake-ffprobe");
    std::fs::write(
        &probe_path,
        format!(
            "#!/bin/sh\ntouch '{}'\necho {}\n",
            probe_marker.display(),
            duration
        ),
    )
    .unwrap();
    std::fs::set_permissions(&probe_path, std::fs::Permissions::from_mode(0o755)).unwrap();

    let splitter_path = dir.path().join("fake-ffmpeg");
    std::fs::write(
        &splitter_path,
        format!(
            "#!/bin/sh\necho \"$@\" >> '{}'\nfor last; do :; done\ntouch \"$last\"\n",
            splitter_log.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&splitter_path, std::fs::Permissions::from_mode(0o755)).unwrap();

    StubTools {
        probe: MediaProbe::new(probe_path.to_string_lossy().into_owned()),
        segmenter: Segmenter::new(splitter_path.to_string_lossy().into_owned(), SplitMode::Copy),
        probe_marker,
        splitter_log,
    }
}

/// One observed transcription call
#[derive(Debug, Clone)]
struct TranscribeCall {
    path: PathBuf,
    /// The segment file existed when the call was made
    file_present: bool,
    /// A previously consumed segment file was still on disk
    earlier_file_remaining: bool,
}

/// Mock speech-to-text that records calls and derives each fragment from the
/// segment file's ordinal
struct RecordingTranscriber {
    calls: Arc<Mutex<Vec<TranscribeCall>>>,
    fail_on_index: Option<usize>,
}

impl RecordingTranscriber {
    fn new() -> (Self, Arc<Mutex<Vec<TranscribeCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: calls.clone(),
                fail_on_index: None,
            },
            calls,
        )
    }

    fn failing_on(index: usize) -> (Self, Arc<Mutex<Vec<TranscribeCall>>>) {
        let (mut mock, calls) = Self::new();
        mock.fail_on_index = Some(index);
        (mock, calls)
    }
}

fn segment_index(path: &Path) -> usize {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.strip_prefix("segment-"))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(usize::MAX)
}

#[async_trait]
impl SpeechToText for RecordingTranscriber {
    async fn transcribe_file(
        &self,
        path: &Path,
        _request: &TranscriptionRequest,
    ) -> Result<String, TranscriptionError> {
        let mut calls = self.calls.lock().unwrap();
        let earlier_file_remaining = calls.iter().any(|call| call.path.exists());
        calls.push(TranscribeCall {
            path: path.to_path_buf(),
            file_present: path.exists(),
            earlier_file_remaining,
        });
        drop(calls);

        let index = segment_index(path);
        if self.fail_on_index == Some(index) {
            return Err(TranscriptionError::NetworkError(
                "connection reset".to_string(),
            ));
        }
        Ok(format!("fragment-{}", index))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Mock summarizer that records received transcripts
struct RecordingSummarizer {
    transcripts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingSummarizer {
    fn new(fail: bool) -> (Self, Arc<Mutex<Vec<String>>>) {
        let transcripts = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                transcripts: transcripts.clone(),
                fail,
            },
            transcripts,
        )
    }
}

#[async_trait]
impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String, SummarizationError> {
        self.transcripts.lock().unwrap().push(transcript.to_string());
        if self.fail {
            return Err(SummarizationError::NetworkError(
                "connection reset".to_string(),
            ));
        }
        Ok("## Minutes\n- everything went fine".to_string())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

// ============================================================================
// SECTION 1: Happy Path (Scenario A)
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_twelve_minute_upload_yields_three_segments_and_minutes() {
    let dir = tempfile::tempdir().unwrap();
    let tools = stub_tools(&dir, "720.0");
    let (transcriber, calls) = RecordingTranscriber::new();
    let (summarizer, transcripts) = RecordingSummarizer::new(false);

    let service = MinutesService::with_components(
        tools.probe,
        tools.segmenter,
        Box::new(transcriber),
        Box::new(summarizer),
        300,
        "id".to_string(),
    );

    let state = service.run(b"fake wav bytes", "standup.wav").await;

    assert_eq!(state.stage, RunStage::Done);
    assert_eq!(
        state.transcript.as_deref(),
        Some("fragment-0\nfragment-1\nfragment-2")
    );
    assert_eq!(
        state.summary.as_deref(),
        Some("## Minutes\n- everything went fine")
    );
    assert!(state.error.is_none());
    assert!(!state.run_id.is_nil());

    // Three segments at offsets 0, 300 and 600, cut by stream copy
    let log = std::fs::read_to_string(&tools.splitter_log).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("-ss 0 -t 300"));
    assert!(lines[1].contains("-ss 300 -t 300"));
    assert!(lines[2].contains("-ss 600 -t 300"));
    assert!(lines.iter().all(|line| line.contains("-c copy")));

    // Segments were fetched strictly in ordinal order
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    for (i, call) in calls.iter().enumerate() {
        assert_eq!(segment_index(&call.path), i);
        assert!(call.file_present, "segment {} missing at call time", i);
    }

    // Exactly one summarization call, with the joined transcript embedded
    let transcripts = transcripts.lock().unwrap();
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0], "fragment-0\nfragment-1\nfragment-2");
}

#[cfg(unix)]
#[tokio::test]
async fn test_short_upload_is_a_single_segment() {
    let dir = tempfile::tempdir().unwrap();
    let tools = stub_tools(&dir, "42.7");
    let (transcriber, calls) = RecordingTranscriber::new();
    let (summarizer, _) = RecordingSummarizer::new(false);

    let service = MinutesService::with_components(
        tools.probe,
        tools.segmenter,
        Box::new(transcriber),
        Box::new(summarizer),
        300,
        "id".to_string(),
    );

    let state = service.run(b"fake bytes", "note.m4a").await;

    assert_eq!(state.stage, RunStage::Done);
    assert_eq!(state.transcript.as_deref(), Some("fragment-0"));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

// ============================================================================
// SECTION 2: Validation Rejection (Scenario B)
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_unsupported_extension_rejected_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let tools = stub_tools(&dir, "720.0");
    let (transcriber, calls) = RecordingTranscriber::new();
    let (summarizer, transcripts) = RecordingSummarizer::new(false);

    let service = MinutesService::with_components(
        tools.probe,
        tools.segmenter,
        Box::new(transcriber),
        Box::new(summarizer),
        300,
        "id".to_string(),
    );

    let state = service.run(b"just text", "memo.txt").await;

    assert_eq!(state.stage, RunStage::Errored);
    let message = state.error.unwrap();
    assert!(message.contains("validation failed"));
    assert!(message.contains("wav"), "message should list the accepted set");

    // No subprocess ran and no remote call was made
    assert!(!tools.probe_marker.exists());
    assert!(!tools.splitter_log.exists());
    assert!(calls.lock().unwrap().is_empty());
    assert!(transcripts.lock().unwrap().is_empty());
}

// ============================================================================
// SECTION 3: Mid-Transcription Failure (Scenario C)
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_transcription_failure_aborts_run_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let tools = stub_tools(&dir, "720.0");
    let (transcriber, calls) = RecordingTranscriber::failing_on(1);
    let (summarizer, transcripts) = RecordingSummarizer::new(false);

    let service = MinutesService::with_components(
        tools.probe,
        tools.segmenter,
        Box::new(transcriber),
        Box::new(summarizer),
        300,
        "id".to_string(),
    );

    let state = service.run(b"fake bytes", "standup.wav").await;

    assert_eq!(state.stage, RunStage::Errored);
    let message = state.error.unwrap();
    assert!(message.contains("transcription failed"));
    assert!(message.contains("connection reset"));

    // No partial transcript is surfaced
    assert!(state.transcript.is_none());
    assert!(state.summary.is_none());

    // Segment 2 was never fetched; segment 0's file was already gone when
    // segment 1 was attempted; both consumed files are gone now
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(!calls[1].earlier_file_remaining);
    for call in calls.iter() {
        assert!(!call.path.exists());
    }

    // Summarization was never attempted
    assert!(transcripts.lock().unwrap().is_empty());
}

// ============================================================================
// SECTION 4: Summarization Failure (Scenario D)
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_summarization_failure_keeps_transcript_visible() {
    let dir = tempfile::tempdir().unwrap();
    let tools = stub_tools(&dir, "10.0");
    let (transcriber, _) = RecordingTranscriber::new();
    let (summarizer, transcripts) = RecordingSummarizer::new(true);

    let service = MinutesService::with_components(
        tools.probe,
        tools.segmenter,
        Box::new(transcriber),
        Box::new(summarizer),
        300,
        "id".to_string(),
    );

    let state = service.run(b"fake bytes", "oneliner.ogg").await;

    assert_eq!(state.stage, RunStage::Errored);
    assert!(state.error.unwrap().contains("summarization failed"));

    // The transcript was captured before the failing stage and survives it
    assert_eq!(state.transcript.as_deref(), Some("fragment-0"));
    assert!(state.summary.is_none());
    assert_eq!(transcripts.lock().unwrap().len(), 1);
}

// ============================================================================
// SECTION 5: Reset Semantics
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_reset_is_idempotent_from_done_and_errored() {
    let dir = tempfile::tempdir().unwrap();
    let tools = stub_tools(&dir, "10.0");
    let (transcriber, _) = RecordingTranscriber::new();
    let (summarizer, _) = RecordingSummarizer::new(false);

    let service = MinutesService::with_components(
        tools.probe,
        tools.segmenter,
        Box::new(transcriber),
        Box::new(summarizer),
        300,
        "id".to_string(),
    );

    // From Done
    let state = service.run(b"fake bytes", "note.flac").await;
    assert_eq!(state.stage, RunStage::Done);

    service.reset();
    let state = service.state();
    assert_eq!(state.stage, RunStage::Idle);
    assert!(state.transcript.is_none());
    assert!(state.summary.is_none());
    assert!(state.error.is_none());

    // From Errored
    let state = service.run(b"just text", "memo.txt").await;
    assert_eq!(state.stage, RunStage::Errored);

    service.reset();
    service.reset(); // a second reset changes nothing
    let state = service.state();
    assert_eq!(state.stage, RunStage::Idle);
    assert!(state.transcript.is_none());
    assert!(state.summary.is_none());
    assert!(state.error.is_none());
}

// ============================================================================
// SECTION 6: Probe Failure Cleanup
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_probe_failure_errors_the_run() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let tools = stub_tools(&dir, "unused");

    // Replace the probe with one that fails outright
    let broken = dir.path().join("broken-ffprobe");
    std::fs::write(&broken, "#!/bin/sh\necho 'moov atom not found' >&2\nexit 1\n").unwrap();
    std::fs::set_permissions(&broken, std::fs::Permissions::from_mode(0o755)).unwrap();

    let (transcriber, calls) = RecordingTranscriber::new();
    let (summarizer, transcripts) = RecordingSummarizer::new(false);

    let service = MinutesService::with_components(
        MediaProbe::new(broken.to_string_lossy().into_owned()),
        tools.segmenter,
        Box::new(transcriber),
        Box::new(summarizer),
        300,
        "id".to_string(),
    );

    let state = service.run(b"fake bytes", "corrupt.mp4").await;

    assert_eq!(state.stage, RunStage::Errored);
    let message = state.error.unwrap();
    assert!(message.contains("probing failed"));
    assert!(message.contains("moov atom not found"));
    assert!(calls.lock().unwrap().is_empty());
    assert!(transcripts.lock().unwrap().is_empty());
}
