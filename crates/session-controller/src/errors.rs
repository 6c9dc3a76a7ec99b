//! Session controller error types.
//!
//! The taxonomy separates fatal-for-the-attempt failures (credential,
//! connection, join rejection - the session lands in `Failed` and a fresh
//! start is required) from purely informational outcomes. Admission
//! rejections are deliberately NOT errors: they are ordinary
//! `AdmissionDecision` values that never disturb session state.

use crate::credential::CredentialError;
use crate::recording::RecordingDenied;
use crate::sdk::SdkError;
use thiserror::Error;

/// Session controller error type.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Credential generation failed.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// A freshly generated credential is already at or near expiry; the
    /// join was not attempted.
    #[error("Join credential is stale")]
    StaleCredential,

    /// Connecting/initializing the platform failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The platform rejected the join.
    #[error("Join rejected: {0}")]
    JoinRejected(String),

    /// A platform capability call failed outside the join sequence.
    #[error("SDK error: {0}")]
    Sdk(String),

    /// A recording request was denied or its platform call failed.
    #[error("Recording error: {0}")]
    Recording(String),

    /// The operation is not valid in the current lifecycle state.
    #[error("Invalid state for {operation}: {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// A pending start was cancelled by a leave request.
    #[error("Start cancelled by leave request")]
    Cancelled,

    /// Internal error (actor channel failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ControllerError {
    /// Whether this error ends the current session attempt.
    ///
    /// Non-fatal errors leave the session exactly as it was; fatal ones
    /// require a fresh start request.
    #[must_use]
    pub fn is_fatal_for_session(&self) -> bool {
        match self {
            ControllerError::Credential(_)
            | ControllerError::StaleCredential
            | ControllerError::Connection(_)
            | ControllerError::JoinRejected(_)
            | ControllerError::Cancelled => true,
            ControllerError::Sdk(_)
            | ControllerError::Recording(_)
            | ControllerError::InvalidState { .. }
            | ControllerError::Internal(_) => false,
        }
    }
}

impl From<SdkError> for ControllerError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::Connection(msg) => ControllerError::Connection(msg),
            SdkError::JoinRejected(msg) => ControllerError::JoinRejected(msg),
            SdkError::Operation(msg) => ControllerError::Sdk(msg),
        }
    }
}

impl From<RecordingDenied> for ControllerError {
    fn from(err: RecordingDenied) -> Self {
        ControllerError::Recording(err.to_string())
    }
}
