//! Cloud recording sub-state machine.
//!
//! Recording control is strictly separated from session state: a recording
//! failure never disturbs the lifecycle or the share slots. The planner is
//! pure - it maps (current state, request) to the platform action and the
//! state that becomes current once that action succeeds. The session actor
//! executes the action and commits only on success.

use thiserror::Error;

/// Cloud recording state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// No recording in progress.
    #[default]
    Idle,
    /// Recording is running.
    Recording,
    /// Recording is paused.
    Paused,
}

/// A recording control request from the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingRequest {
    /// Begin a cloud recording.
    Start,
    /// Pause a running recording, or resume a paused one.
    PauseOrResume,
    /// Stop the recording.
    Stop,
}

/// Platform action required to satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingAction {
    StartCloud,
    PauseCloud,
    ResumeCloud,
    StopCloud,
}

/// A planned transition: the action to execute and the state to commit on
/// success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingStep {
    pub action: RecordingAction,
    pub next: RecordingState,
}

/// Why a recording request was denied.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RecordingDenied {
    #[error("recording already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,
}

/// Tracks recording state for one session.
#[derive(Debug, Default)]
pub struct RecordingControl {
    state: RecordingState,
}

impl RecordingControl {
    /// Current recording state.
    #[must_use]
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Plan the transition for `request` from the current state.
    ///
    /// # Errors
    ///
    /// Returns [`RecordingDenied`] when the request is not legal in the
    /// current state; no platform action should be taken in that case.
    pub fn plan(&self, request: RecordingRequest) -> Result<RecordingStep, RecordingDenied> {
        match (self.state, request) {
            (RecordingState::Idle, RecordingRequest::Start) => Ok(RecordingStep {
                action: RecordingAction::StartCloud,
                next: RecordingState::Recording,
            }),
            (RecordingState::Recording | RecordingState::Paused, RecordingRequest::Start) => {
                Err(RecordingDenied::AlreadyRecording)
            }
            (RecordingState::Recording, RecordingRequest::PauseOrResume) => Ok(RecordingStep {
                action: RecordingAction::PauseCloud,
                next: RecordingState::Paused,
            }),
            (RecordingState::Paused, RecordingRequest::PauseOrResume) => Ok(RecordingStep {
                action: RecordingAction::ResumeCloud,
                next: RecordingState::Recording,
            }),
            (RecordingState::Recording | RecordingState::Paused, RecordingRequest::Stop) => {
                Ok(RecordingStep {
                    action: RecordingAction::StopCloud,
                    next: RecordingState::Idle,
                })
            }
            (RecordingState::Idle, RecordingRequest::PauseOrResume | RecordingRequest::Stop) => {
                Err(RecordingDenied::NotRecording)
            }
        }
    }

    /// Commit a successfully executed step.
    pub fn commit(&mut self, step: RecordingStep) {
        self.state = step.next;
    }

    /// Reset to idle (session left or failed).
    pub fn reset(&mut self) {
        self.state = RecordingState::Idle;
    }
}
