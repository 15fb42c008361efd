//! Run State
//!
//! Status snapshot for one upload cycle, consumable by any front end.

use serde::Serialize;
use uuid::Uuid;

/// Stage of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    #[default]
    Idle,
    Uploading,
    Segmenting,
    /// `done` of `total` segments have completed transcription
    Transcribing {
        done: usize,
        total: usize,
    },
    Joining,
    Summarizing,
    Done,
    Errored,
}

impl RunStage {
    /// Terminal stages accept only "start new run"
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStage::Done | RunStage::Errored)
    }
}

/// State of one upload cycle
///
/// Exactly one run is active at a time; "start new run" resets this to its
/// default. The transcript is set before summarization is attempted, so it
/// survives a summarization failure.
#[derive(Debug, Clone, Serialize)]
pub struct RunState {
    /// Identity of the run that produced this state
    pub run_id: Uuid,
    pub stage: RunStage,
    pub transcript: Option<String>,
    pub summary: Option<String>,
    /// Human-readable failure description naming the failing stage
    pub error: Option<String>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            run_id: Uuid::nil(),
            stage: RunStage::Idle,
            transcript: None,
            summary: None,
            error: None,
        }
    }
}
