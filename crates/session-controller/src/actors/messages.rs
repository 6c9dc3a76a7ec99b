//! Message and state types for the session actor.

use crate::admission::{AdmissionDecision, Participant, ShareSlot};
use crate::errors::ControllerError;
use crate::recording::RecordingState;
use crate::sdk::ShareSurface;
use common::types::UserId;
use std::fmt;
use tokio::sync::oneshot;

/// Lifecycle state of a session.
///
/// `Failed` is terminal and preserves the failure reason; there is no
/// automatic retry, re-entry requires a fresh session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No start requested yet.
    Idle,
    /// Generating the join credential.
    CredentialPending,
    /// Initializing the platform connection.
    Connecting,
    /// Join call in flight.
    Joining,
    /// In the session; admission wired to the event stream.
    Joined,
    /// Leave in progress.
    Leaving,
    /// Session over; all participants and slots cleared.
    Left,
    /// Terminal failure; reason preserved for inspection.
    Failed { reason: String },
}

impl SessionState {
    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Left | SessionState::Failed { .. })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::CredentialPending => write!(f, "CredentialPending"),
            SessionState::Connecting => write!(f, "Connecting"),
            SessionState::Joining => write!(f, "Joining"),
            SessionState::Joined => write!(f, "Joined"),
            SessionState::Leaving => write!(f, "Leaving"),
            SessionState::Left => write!(f, "Left"),
            SessionState::Failed { .. } => write!(f, "Failed"),
        }
    }
}

/// Commands accepted by the session actor.
#[derive(Debug)]
pub enum SessionCommand {
    /// Start the session: credential, connect, join, elevate privilege.
    Start {
        respond_to: oneshot::Sender<Result<(), ControllerError>>,
    },
    /// Leave the session (or cancel a pending start).
    Leave {
        respond_to: oneshot::Sender<Result<(), ControllerError>>,
    },
    /// Request a local screen share into `surface`.
    StartShare {
        surface: ShareSurface,
        respond_to: oneshot::Sender<Result<AdmissionDecision, ControllerError>>,
    },
    /// Stop the local screen share.
    StopShare {
        respond_to: oneshot::Sender<Result<(), ControllerError>>,
    },
    /// Start a cloud recording.
    StartRecording {
        respond_to: oneshot::Sender<Result<(), ControllerError>>,
    },
    /// Pause or resume the cloud recording.
    PauseOrResumeRecording {
        respond_to: oneshot::Sender<Result<(), ControllerError>>,
    },
    /// Stop the cloud recording.
    StopRecording {
        respond_to: oneshot::Sender<Result<(), ControllerError>>,
    },
    /// Observe current session state.
    Snapshot {
        respond_to: oneshot::Sender<SessionSnapshot>,
    },
}

/// Point-in-time view of the session for callers and tests.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Lifecycle state.
    pub state: SessionState,
    /// Registered participants (unordered).
    pub participants: Vec<Participant>,
    /// Active share slots, ordered by slot index.
    pub share_slots: Vec<ShareSlot>,
    /// Cloud recording state.
    pub recording: RecordingState,
    /// Whether the platform confirmed the multi-share privilege.
    pub multi_share_elevated: bool,
    /// Local user's platform-assigned id, once joined.
    pub local_user: Option<UserId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Left.is_terminal());
        assert!(SessionState::Failed {
            reason: "x".to_string()
        }
        .is_terminal());
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::Joined.is_terminal());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(SessionState::CredentialPending.to_string(), "CredentialPending");
        assert_eq!(
            SessionState::Failed {
                reason: "boom".to_string()
            }
            .to_string(),
            "Failed"
        );
    }
}
