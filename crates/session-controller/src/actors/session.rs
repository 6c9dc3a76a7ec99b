//! `SessionActor` - per-session actor that owns the lifecycle state machine
//! and the admission controller.
//!
//! Each `SessionActor`:
//! - Drives startup ordering: credential -> connect -> join -> elevate the
//!   session-wide multi-share privilege -> wire adapter events
//! - Owns the `AdmissionController` (participant registry + share slots)
//! - Owns the `SdkCapability` implementation and is its only caller
//! - Notifies the `RendererBinding` of slot assignments and releases
//!
//! # Ordering Guarantees
//!
//! Commands and adapter events are drained from one mailbox/stream pair and
//! handled one at a time; no handler overlaps another. Admission decisions
//! happen synchronously inside a handler - suspension points exist only in
//! the lifecycle transitions (credential work, connect/join/leave calls).
//!
//! # Cancellation
//!
//! A leave request that arrives while a start is still in flight cancels the
//! startup at its current await point and lands in `Left` with no residual
//! participants or slots. The in-flight credential and connection attempt
//! are discarded without side effects.

use crate::admission::{AdmissionController, AdmissionDecision};
use crate::config::Config;
use crate::credential::{self, SessionIdentity};
use crate::errors::ControllerError;
use crate::recording::{RecordingAction, RecordingControl, RecordingRequest};
use crate::renderer::{MediaSource, RendererBinding};
use crate::sdk::events::{self, ConnectionChange, SessionEvent, ShareAction};
use crate::sdk::{InitOptions, LocalUser, SdkCapability, SharePrivilege, ShareSurface};

use super::messages::{SessionCommand, SessionSnapshot, SessionState};

use common::secret::ExposeSecret;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Channel buffer size for the session mailbox.
const SESSION_CHANNEL_BUFFER: usize = 64;

/// A credential this close to expiry is not presented to join; the join
/// operation's own rejection remains the authoritative backstop.
const STALE_CREDENTIAL_MARGIN: Duration = Duration::from_secs(30);

/// Handle to a `SessionActor`.
///
/// This is the public interface for interacting with the session. All
/// methods are async and return results via oneshot channels.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
    cancel_token: CancellationToken,
    startup_abort: CancellationToken,
    session_name: String,
}

impl SessionHandle {
    /// Session (topic) name this handle controls.
    #[must_use]
    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    /// Start the session: acquire a credential, connect, join, and elevate
    /// the multi-share privilege.
    ///
    /// # Errors
    ///
    /// Credential, connection, and join failures land the session in
    /// `Failed`; [`ControllerError::Cancelled`] is returned when a leave
    /// request cancelled the start.
    pub async fn start(&self) -> Result<(), ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Start { respond_to: tx })
            .await
            .map_err(|e| ControllerError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ControllerError::Internal(format!("response receive failed: {e}")))?
    }

    /// Leave the session, or cancel a start that has not reached `Joined`.
    ///
    /// Idempotent: leaving an already-left session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Internal`] if the actor is gone.
    pub async fn leave(&self) -> Result<(), ControllerError> {
        // Cancel any in-flight startup before the message is processed so
        // the pending join sequence is abandoned at its current await point.
        self.startup_abort.cancel();

        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Leave { respond_to: tx })
            .await
            .map_err(|e| ControllerError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ControllerError::Internal(format!("response receive failed: {e}")))?
    }

    /// Request a local screen share into `surface`.
    ///
    /// The request is admission-checked with the identical rule applied to
    /// remote sharers; a rejection is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the session is not joined or the platform
    /// refuses to start the capture.
    pub async fn start_share(
        &self,
        surface: ShareSurface,
    ) -> Result<AdmissionDecision, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::StartShare {
                surface,
                respond_to: tx,
            })
            .await
            .map_err(|e| ControllerError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ControllerError::Internal(format!("response receive failed: {e}")))?
    }

    /// Stop the local screen share. No-op if not sharing.
    ///
    /// # Errors
    ///
    /// Returns an error when the session is not joined or the platform call
    /// fails (the slot is retained in that case).
    pub async fn stop_share(&self) -> Result<(), ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::StopShare { respond_to: tx })
            .await
            .map_err(|e| ControllerError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ControllerError::Internal(format!("response receive failed: {e}")))?
    }

    /// Start a cloud recording.
    ///
    /// # Errors
    ///
    /// Recording errors are non-fatal; session state is never affected.
    pub async fn start_recording(&self) -> Result<(), ControllerError> {
        self.recording_command(|tx| SessionCommand::StartRecording { respond_to: tx })
            .await
    }

    /// Pause a running recording, or resume a paused one.
    ///
    /// # Errors
    ///
    /// Recording errors are non-fatal; session state is never affected.
    pub async fn pause_or_resume_recording(&self) -> Result<(), ControllerError> {
        self.recording_command(|tx| SessionCommand::PauseOrResumeRecording { respond_to: tx })
            .await
    }

    /// Stop the recording.
    ///
    /// # Errors
    ///
    /// Recording errors are non-fatal; session state is never affected.
    pub async fn stop_recording(&self) -> Result<(), ControllerError> {
        self.recording_command(|tx| SessionCommand::StopRecording { respond_to: tx })
            .await
    }

    /// Observe current session state.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Internal`] if the actor is gone.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Snapshot { respond_to: tx })
            .await
            .map_err(|e| ControllerError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ControllerError::Internal(format!("response receive failed: {e}")))
    }

    /// Cancel the actor (for immediate teardown).
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    async fn recording_command(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<(), ControllerError>>) -> SessionCommand,
    ) -> Result<(), ControllerError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|e| ControllerError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ControllerError::Internal(format!("response receive failed: {e}")))?
    }
}

/// The `SessionActor` implementation.
pub struct SessionActor<S: SdkCapability> {
    /// Session configuration.
    config: Config,
    /// Command receiver.
    receiver: mpsc::Receiver<SessionCommand>,
    /// Cancellation token for actor teardown.
    cancel_token: CancellationToken,
    /// Cancelled when a leave request must abort an in-flight start.
    startup_abort: CancellationToken,
    /// The external platform capability; this actor is its only caller.
    sdk: S,
    /// Renderer binding for slot notifications.
    renderer: Box<dyn RendererBinding>,
    /// Lifecycle state.
    state: SessionState,
    /// Participant registry and share slots.
    admission: AdmissionController,
    /// Cloud recording sub-state.
    recording: RecordingControl,
    /// Local user, once joined.
    local_user: Option<LocalUser>,
    /// Whether the platform confirmed the multi-share privilege.
    multi_share_elevated: bool,
}

impl<S: SdkCapability + 'static> SessionActor<S> {
    /// Spawn a new session actor.
    ///
    /// Returns a handle and the task join handle. The actor takes exclusive
    /// ownership of the platform capability and the renderer binding.
    pub fn spawn(
        config: Config,
        sdk: S,
        renderer: Box<dyn RendererBinding>,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(SESSION_CHANNEL_BUFFER);
        let cancel_token = CancellationToken::new();
        let startup_abort = CancellationToken::new();
        let session_name = config.session_name.clone();

        let actor = Self {
            config,
            receiver,
            cancel_token: cancel_token.clone(),
            startup_abort: startup_abort.clone(),
            sdk,
            renderer,
            state: SessionState::Idle,
            admission: AdmissionController::new(),
            recording: RecordingControl::default(),
            local_user: None,
            multi_share_elevated: false,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = SessionHandle {
            sender,
            cancel_token,
            startup_abort,
            session_name,
        };

        (handle, task_handle)
    }

    /// Run the actor dispatch loop.
    #[instrument(skip_all, name = "sc.actor.session", fields(session = %self.config.session_name))]
    async fn run(mut self) {
        info!(
            target: "sc.actor.session",
            session = %self.config.session_name,
            "SessionActor started"
        );

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "sc.actor.session",
                        "SessionActor received cancellation signal"
                    );
                    self.teardown().await;
                    break;
                }

                command = self.receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        None => {
                            info!(
                                target: "sc.actor.session",
                                "SessionActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }

                // The adapter's event stream is wired only once joined; events
                // queued before that stay queued, preserving arrival order.
                raw = self.sdk.next_raw_event(), if self.state == SessionState::Joined => {
                    match raw {
                        Some(raw) => {
                            if let Some(event) = events::normalize(&raw) {
                                self.handle_event(event);
                            }
                        }
                        None => {
                            warn!(
                                target: "sc.actor.session",
                                "Platform event stream closed unexpectedly"
                            );
                            self.fail("platform event stream closed".to_string());
                        }
                    }
                }
            }
        }

        info!(
            target: "sc.actor.session",
            state = %self.state,
            "SessionActor stopped"
        );
    }

    /// Handle a single command.
    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start { respond_to } => {
                let result = self.handle_start().await;
                let _ = respond_to.send(result);
            }
            SessionCommand::Leave { respond_to } => {
                let result = self.handle_leave().await;
                let _ = respond_to.send(result);
            }
            SessionCommand::StartShare {
                surface,
                respond_to,
            } => {
                let result = self.handle_start_share(surface).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::StopShare { respond_to } => {
                let result = self.handle_stop_share().await;
                let _ = respond_to.send(result);
            }
            SessionCommand::StartRecording { respond_to } => {
                let result = self.handle_recording(RecordingRequest::Start).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::PauseOrResumeRecording { respond_to } => {
                let result = self.handle_recording(RecordingRequest::PauseOrResume).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::StopRecording { respond_to } => {
                let result = self.handle_recording(RecordingRequest::Stop).await;
                let _ = respond_to.send(result);
            }
            SessionCommand::Snapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }
        }
    }

    /// Handle a start request.
    #[instrument(skip_all, fields(session = %self.config.session_name))]
    async fn handle_start(&mut self) -> Result<(), ControllerError> {
        if self.state != SessionState::Idle {
            return Err(ControllerError::InvalidState {
                operation: "start",
                state: self.state.to_string(),
            });
        }

        let abort = self.startup_abort.clone();
        let result = tokio::select! {
            biased;
            () = abort.cancelled() => Err(ControllerError::Cancelled),
            result = self.join_sequence() => result,
        };

        match result {
            Ok(()) => {
                info!(
                    target: "sc.actor.session",
                    multi_share_elevated = self.multi_share_elevated,
                    "Session joined"
                );
                Ok(())
            }
            Err(ControllerError::Cancelled) => {
                // Leave arrived before Joined: discard the in-flight
                // credential/connection attempt without side effects.
                self.transition(SessionState::Leaving);
                self.clear_session_state();
                self.transition(SessionState::Left);
                info!(
                    target: "sc.actor.session",
                    "Start cancelled by leave request"
                );
                Err(ControllerError::Cancelled)
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// The startup ordering: credential -> connect -> join -> privilege.
    async fn join_sequence(&mut self) -> Result<(), ControllerError> {
        self.transition(SessionState::CredentialPending);

        let identity = SessionIdentity {
            session_name: self.config.session_name.clone(),
            user_identity: self.config.display_name.clone(),
            role: self.config.role,
        };
        let validity = Duration::from_secs(self.config.credential_ttl_seconds);
        let credential = credential::generate(
            &identity,
            &self.config.sdk_key,
            &self.config.sdk_secret,
            validity,
            || chrono::Utc::now().timestamp(),
        )?;

        // Never present a token that is already dying; the join call's own
        // rejection stays the authoritative backstop.
        let now = chrono::Utc::now().timestamp();
        if credential.is_expired_at(now) || credential.expires_within(STALE_CREDENTIAL_MARGIN, now)
        {
            return Err(ControllerError::StaleCredential);
        }

        self.transition(SessionState::Connecting);
        self.sdk
            .init(
                &self.config.dependency_asset_path,
                &self.config.language,
                InitOptions::default(),
            )
            .await
            .map_err(|e| ControllerError::Connection(e.to_string()))?;

        self.transition(SessionState::Joining);
        let local = self
            .sdk
            .join(
                &self.config.session_name,
                &credential.token,
                &self.config.display_name,
                self.config
                    .session_password
                    .as_ref()
                    .map(|p| p.expose_secret()),
            )
            .await
            .map_err(ControllerError::from)?;

        // The local user is a participant like any other.
        self.admission
            .on_participant_joined(local.user_id, local.display_name.clone());
        self.local_user = Some(local);

        // Session-wide setting, established once, before any share-start can
        // be legitimately admitted.
        self.sdk
            .set_share_privilege(SharePrivilege::MultipleShare)
            .await
            .map_err(|e| ControllerError::Sdk(e.to_string()))?;

        if self.sdk.share_privilege() == SharePrivilege::MultipleShare {
            self.multi_share_elevated = true;
        } else {
            // The local cap still holds; only the platform-side allowance is
            // in doubt.
            warn!(
                target: "sc.actor.session",
                "Platform did not confirm multi-share privilege"
            );
        }

        self.transition(SessionState::Joined);
        Ok(())
    }

    /// Handle a leave request.
    #[instrument(skip_all, fields(session = %self.config.session_name))]
    async fn handle_leave(&mut self) -> Result<(), ControllerError> {
        match self.state {
            SessionState::Joined => {
                self.transition(SessionState::Leaving);

                // Stop a live local capture before leaving; a failure here
                // must not block the leave.
                if let Some(user_id) = self.local_user.as_ref().map(|u| u.user_id) {
                    if self.admission.is_sharing(user_id) {
                        if let Err(e) = self.sdk.stop_share_screen().await {
                            warn!(
                                target: "sc.actor.session",
                                error = %e,
                                "Failed to stop local share during leave"
                            );
                        }
                    }
                }

                if let Err(e) = self.sdk.leave().await {
                    warn!(
                        target: "sc.actor.session",
                        error = %e,
                        "Platform leave reported an error"
                    );
                }

                self.clear_session_state();
                self.transition(SessionState::Left);
                Ok(())
            }
            SessionState::Idle => {
                // Nothing was started; land directly in Left.
                self.transition(SessionState::Left);
                Ok(())
            }
            // Idempotent for every state a leave can observe after the
            // startup-abort race or a prior leave/failure.
            _ => Ok(()),
        }
    }

    /// Handle a local share-start request.
    #[instrument(skip_all, fields(session = %self.config.session_name))]
    async fn handle_start_share(
        &mut self,
        surface: ShareSurface,
    ) -> Result<AdmissionDecision, ControllerError> {
        if self.state != SessionState::Joined {
            return Err(ControllerError::InvalidState {
                operation: "start_share",
                state: self.state.to_string(),
            });
        }
        let user_id = self
            .local_user
            .as_ref()
            .map(|u| u.user_id)
            .ok_or_else(|| ControllerError::Internal("joined without local user".to_string()))?;

        // Early rejection with the identical rule applied to remote sharers.
        let decision = self
            .admission
            .on_share_start_requested(user_id, chrono::Utc::now().timestamp());

        match decision {
            AdmissionDecision::Admitted(slot_index) => {
                if let Err(e) = self.sdk.start_share_screen(&surface).await {
                    // Roll the slot back; admitted capacity must not leak.
                    let _ = self.admission.on_share_stopped(user_id);
                    return Err(ControllerError::Sdk(e.to_string()));
                }
                info!(
                    target: "sc.actor.session",
                    slot = %slot_index,
                    surface = surface.element_id(),
                    "Local share started"
                );
                self.renderer
                    .on_slot_assigned(user_id, slot_index, &MediaSource::Local(surface));
                Ok(decision)
            }
            AdmissionDecision::Rejected(reason) => {
                info!(
                    target: "sc.actor.session",
                    reason = ?reason,
                    "Local share request rejected"
                );
                Ok(decision)
            }
        }
    }

    /// Handle a local share-stop request. No-op if not sharing.
    async fn handle_stop_share(&mut self) -> Result<(), ControllerError> {
        if self.state != SessionState::Joined {
            return Err(ControllerError::InvalidState {
                operation: "stop_share",
                state: self.state.to_string(),
            });
        }
        let user_id = self
            .local_user
            .as_ref()
            .map(|u| u.user_id)
            .ok_or_else(|| ControllerError::Internal("joined without local user".to_string()))?;

        if !self.admission.is_sharing(user_id) {
            return Ok(());
        }

        self.sdk
            .stop_share_screen()
            .await
            .map_err(|e| ControllerError::Sdk(e.to_string()))?;

        if let Some(slot) = self.admission.on_share_stopped(user_id) {
            self.renderer.on_slot_freed(slot.user_id, slot.slot_index);
        }
        Ok(())
    }

    /// Handle a recording control request.
    async fn handle_recording(&mut self, request: RecordingRequest) -> Result<(), ControllerError> {
        if self.state != SessionState::Joined {
            return Err(ControllerError::InvalidState {
                operation: "recording",
                state: self.state.to_string(),
            });
        }

        let step = self.recording.plan(request)?;
        let result = match step.action {
            RecordingAction::StartCloud => self.sdk.start_cloud_recording().await,
            RecordingAction::PauseCloud => self.sdk.pause_cloud_recording().await,
            RecordingAction::ResumeCloud => self.sdk.resume_cloud_recording().await,
            RecordingAction::StopCloud => self.sdk.stop_cloud_recording().await,
        };
        result.map_err(|e| ControllerError::Recording(e.to_string()))?;

        self.recording.commit(step);
        debug!(
            target: "sc.actor.session",
            state = ?self.recording.state(),
            "Recording state committed"
        );
        Ok(())
    }

    /// Apply one normalized adapter event. Synchronous: admission decisions
    /// never suspend.
    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::UserAdded {
                user_id,
                display_name,
            } => {
                self.admission.on_participant_joined(user_id, display_name);
            }
            SessionEvent::UserRemoved { user_id } => {
                if let Some(slot) = self.admission.on_participant_left(user_id) {
                    self.renderer.on_slot_freed(slot.user_id, slot.slot_index);
                }
            }
            SessionEvent::ShareStateChanged {
                user_id,
                action: ShareAction::Start,
            } => {
                let decision = self
                    .admission
                    .on_share_start_requested(user_id, chrono::Utc::now().timestamp());
                match decision {
                    AdmissionDecision::Admitted(slot_index) => {
                        self.renderer
                            .on_slot_assigned(user_id, slot_index, &MediaSource::Remote);
                    }
                    AdmissionDecision::Rejected(reason) => {
                        // Defensive double-check: the platform should have
                        // enforced the same limit, but we never assume it did.
                        debug!(
                            target: "sc.actor.session",
                            user_id = %user_id,
                            reason = ?reason,
                            "Remote share-start rejected by local admission"
                        );
                    }
                }
            }
            SessionEvent::ShareStateChanged {
                user_id,
                action: ShareAction::Stop,
            } => {
                if let Some(slot) = self.admission.on_share_stopped(user_id) {
                    self.renderer.on_slot_freed(slot.user_id, slot.slot_index);
                }
            }
            SessionEvent::PassivelyStopShare => {
                // The platform already ended the local capture; only the
                // slot bookkeeping remains.
                if let Some(user_id) = self.local_user.as_ref().map(|u| u.user_id) {
                    if let Some(slot) = self.admission.on_share_stopped(user_id) {
                        info!(
                            target: "sc.actor.session",
                            slot = %slot.slot_index,
                            "Local share stopped by platform"
                        );
                        self.renderer.on_slot_freed(slot.user_id, slot.slot_index);
                    }
                }
            }
            SessionEvent::ConnectionChanged { state, reason } => {
                self.handle_connection_change(state, reason);
            }
        }
    }

    fn handle_connection_change(&mut self, change: ConnectionChange, reason: Option<String>) {
        match change {
            ConnectionChange::Connected => {
                debug!(target: "sc.actor.session", "Connection (re-)established");
            }
            ConnectionChange::Reconnecting => {
                warn!(target: "sc.actor.session", "Connection degraded, reconnecting");
            }
            ConnectionChange::Closed => {
                // Forced disconnect: the session ended server-side.
                info!(
                    target: "sc.actor.session",
                    reason = reason.as_deref().unwrap_or("unspecified"),
                    "Session closed by platform"
                );
                self.transition(SessionState::Leaving);
                self.clear_session_state();
                self.transition(SessionState::Left);
            }
            ConnectionChange::Failed => {
                self.fail(reason.unwrap_or_else(|| "connection failed".to_string()));
            }
        }
    }

    /// Clear participants, slots, and recording state in one step, emitting
    /// freed notifications for every active slot.
    fn clear_session_state(&mut self) {
        for slot in self.admission.clear() {
            self.renderer.on_slot_freed(slot.user_id, slot.slot_index);
        }
        self.recording.reset();
        self.local_user = None;
        self.multi_share_elevated = false;
    }

    /// Transition to `Failed`, preserving the reason and clearing all local
    /// session state.
    fn fail(&mut self, reason: String) {
        warn!(
            target: "sc.actor.session",
            from = %self.state,
            reason = %reason,
            "Session failed"
        );
        self.clear_session_state();
        self.state = SessionState::Failed { reason };
    }

    fn transition(&mut self, next: SessionState) {
        debug!(
            target: "sc.actor.session",
            from = %self.state,
            to = %next,
            "State transition"
        );
        self.state = next;
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            participants: self.admission.participants(),
            share_slots: self.admission.share_slots(),
            recording: self.recording.state(),
            multi_share_elevated: self.multi_share_elevated,
            local_user: self.local_user.as_ref().map(|u| u.user_id),
        }
    }

    /// Best-effort teardown on actor cancellation.
    async fn teardown(&mut self) {
        if self.state == SessionState::Joined {
            if let Err(e) = self.sdk.leave().await {
                warn!(
                    target: "sc.actor.session",
                    error = %e,
                    "Platform leave failed during teardown"
                );
            }
            self.clear_session_state();
            self.state = SessionState::Left;
        }
    }
}
