//! Mock conferencing SDK for controller testing.
//!
//! Provides a scripted [`SdkCapability`] implementation that can be
//! configured to:
//! - Accept or fail initialization and join
//! - Validate join-token expiry the way the real platform does (the
//!   authoritative backstop for stale credentials)
//! - Stall the join forever (for cancellation tests)
//! - Fail screen-capture or recording calls
//!
//! Every capability call is recorded; the paired [`MockSdkDriver`] injects
//! raw platform events and inspects the call log from the outside while the
//! actor owns the mock.

use common::jwt::{decode_claims, validate_exp};
use common::types::UserId;
use serde_json::{json, Value};
use session_controller::sdk::{
    InitOptions, LocalUser, RawSdkEvent, SdkCapability, SdkError, SharePrivilege, ShareSurface,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A recorded capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCall {
    Init,
    Join {
        session_name: String,
        user_name: String,
        with_password: bool,
    },
    Leave,
    SetSharePrivilege(SharePrivilege),
    StartShareScreen(ShareSurface),
    StopShareScreen,
    StartCloudRecording,
    PauseCloudRecording,
    ResumeCloudRecording,
    StopCloudRecording,
}

/// Builder for [`MockSdk`] configuration.
#[derive(Debug, Default)]
pub struct MockSdkBuilder {
    local_user: Option<(u32, String)>,
    fail_init: Option<String>,
    reject_join: Option<String>,
    stall_join: bool,
    skip_token_checks: bool,
    fail_share: Option<String>,
    fail_recording: Option<String>,
    deny_multi_share: bool,
}

impl MockSdkBuilder {
    /// Set the local user reported by a successful join.
    #[must_use]
    pub fn local_user(mut self, user_id: u32, display_name: &str) -> Self {
        self.local_user = Some((user_id, display_name.to_string()));
        self
    }

    /// Fail `init` with the given reason.
    #[must_use]
    pub fn fail_init(mut self, reason: &str) -> Self {
        self.fail_init = Some(reason.to_string());
        self
    }

    /// Reject `join` with the given reason (after token checks).
    #[must_use]
    pub fn reject_join(mut self, reason: &str) -> Self {
        self.reject_join = Some(reason.to_string());
        self
    }

    /// Make `join` pend forever; for cancellation tests.
    #[must_use]
    pub fn stall_join(mut self) -> Self {
        self.stall_join = true;
        self
    }

    /// Disable the platform-side token expiry/shape validation.
    #[must_use]
    pub fn skip_token_checks(mut self) -> Self {
        self.skip_token_checks = true;
        self
    }

    /// Fail `start_share_screen` with the given reason.
    #[must_use]
    pub fn fail_share(mut self, reason: &str) -> Self {
        self.fail_share = Some(reason.to_string());
        self
    }

    /// Fail every recording call with the given reason.
    #[must_use]
    pub fn fail_recording(mut self, reason: &str) -> Self {
        self.fail_recording = Some(reason.to_string());
        self
    }

    /// Accept `set_share_privilege` but keep reporting `SingleShare`.
    #[must_use]
    pub fn deny_multi_share(mut self) -> Self {
        self.deny_multi_share = true;
        self
    }

    /// Build the mock and its driver.
    #[must_use]
    pub fn build(self) -> (MockSdk, MockSdkDriver) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (user_id, display_name) = self
            .local_user
            .unwrap_or((1_000_001, "local-user".to_string()));

        let sdk = MockSdk {
            local_user: LocalUser {
                user_id: UserId(user_id),
                display_name,
            },
            fail_init: self.fail_init,
            reject_join: self.reject_join,
            stall_join: self.stall_join,
            skip_token_checks: self.skip_token_checks,
            fail_share: self.fail_share,
            fail_recording: self.fail_recording,
            deny_multi_share: self.deny_multi_share,
            privilege: SharePrivilege::SingleShare,
            events: event_rx,
            calls: Arc::clone(&calls),
        };

        let driver = MockSdkDriver { event_tx, calls };
        (sdk, driver)
    }
}

/// Mock SDK capability.
pub struct MockSdk {
    local_user: LocalUser,
    fail_init: Option<String>,
    reject_join: Option<String>,
    stall_join: bool,
    skip_token_checks: bool,
    fail_share: Option<String>,
    fail_recording: Option<String>,
    deny_multi_share: bool,
    privilege: SharePrivilege,
    events: mpsc::UnboundedReceiver<RawSdkEvent>,
    calls: Arc<Mutex<Vec<SdkCall>>>,
}

impl MockSdk {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> MockSdkBuilder {
        MockSdkBuilder::default()
    }

    fn record(&self, call: SdkCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn recording_result(&self) -> Result<(), SdkError> {
        match &self.fail_recording {
            Some(reason) => Err(SdkError::Operation(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl SdkCapability for MockSdk {
    async fn init(
        &mut self,
        _dependency_asset_path: &str,
        _language: &str,
        _options: InitOptions,
    ) -> Result<(), SdkError> {
        self.record(SdkCall::Init);
        match &self.fail_init {
            Some(reason) => Err(SdkError::Connection(reason.clone())),
            None => Ok(()),
        }
    }

    async fn join(
        &mut self,
        session_name: &str,
        token: &str,
        user_name: &str,
        password: Option<&str>,
    ) -> Result<LocalUser, SdkError> {
        self.record(SdkCall::Join {
            session_name: session_name.to_string(),
            user_name: user_name.to_string(),
            with_password: password.is_some(),
        });

        if self.stall_join {
            std::future::pending::<()>().await;
        }

        // The platform's own validation: an expired or mismatched token is
        // rejected here regardless of what the client checked beforehand.
        if !self.skip_token_checks {
            let claims =
                decode_claims(token).map_err(|_| SdkError::JoinRejected("malformed token".to_string()))?;
            validate_exp(claims.exp)
                .map_err(|_| SdkError::JoinRejected("token expired".to_string()))?;
            if claims.tpc != session_name {
                return Err(SdkError::JoinRejected("token/session mismatch".to_string()));
            }
        }

        if let Some(reason) = &self.reject_join {
            return Err(SdkError::JoinRejected(reason.clone()));
        }

        Ok(self.local_user.clone())
    }

    async fn leave(&mut self) -> Result<(), SdkError> {
        self.record(SdkCall::Leave);
        Ok(())
    }

    async fn set_share_privilege(&mut self, privilege: SharePrivilege) -> Result<(), SdkError> {
        self.record(SdkCall::SetSharePrivilege(privilege));
        if !self.deny_multi_share {
            self.privilege = privilege;
        }
        Ok(())
    }

    fn share_privilege(&self) -> SharePrivilege {
        self.privilege
    }

    async fn start_share_screen(&mut self, surface: &ShareSurface) -> Result<(), SdkError> {
        self.record(SdkCall::StartShareScreen(surface.clone()));
        match &self.fail_share {
            Some(reason) => Err(SdkError::Operation(reason.clone())),
            None => Ok(()),
        }
    }

    async fn stop_share_screen(&mut self) -> Result<(), SdkError> {
        self.record(SdkCall::StopShareScreen);
        Ok(())
    }

    async fn start_cloud_recording(&mut self) -> Result<(), SdkError> {
        self.record(SdkCall::StartCloudRecording);
        self.recording_result()
    }

    async fn pause_cloud_recording(&mut self) -> Result<(), SdkError> {
        self.record(SdkCall::PauseCloudRecording);
        self.recording_result()
    }

    async fn resume_cloud_recording(&mut self) -> Result<(), SdkError> {
        self.record(SdkCall::ResumeCloudRecording);
        self.recording_result()
    }

    async fn stop_cloud_recording(&mut self) -> Result<(), SdkError> {
        self.record(SdkCall::StopCloudRecording);
        self.recording_result()
    }

    async fn next_raw_event(&mut self) -> Option<RawSdkEvent> {
        self.events.recv().await
    }
}

/// External driver for a [`MockSdk`] owned by the actor.
///
/// Injects raw platform events (in arrival order) and inspects the recorded
/// call log.
#[derive(Clone)]
pub struct MockSdkDriver {
    event_tx: mpsc::UnboundedSender<RawSdkEvent>,
    calls: Arc<Mutex<Vec<SdkCall>>>,
}

impl MockSdkDriver {
    /// Inject a raw event by name and payload.
    pub fn push_event(&self, name: &str, payload: Value) {
        let _ = self.event_tx.send(RawSdkEvent {
            name: name.to_string(),
            payload,
        });
    }

    /// Inject a `user-added` event.
    pub fn user_added(&self, user_id: u32, display_name: &str) {
        self.push_event(
            "user-added",
            json!({"userId": user_id, "displayName": display_name}),
        );
    }

    /// Inject a `user-removed` event.
    pub fn user_removed(&self, user_id: u32) {
        self.push_event("user-removed", json!({"userId": user_id}));
    }

    /// Inject a share-start for a remote participant.
    pub fn peer_share_start(&self, user_id: u32) {
        self.push_event(
            "peer-share-state-change",
            json!({"userId": user_id, "action": "Start"}),
        );
    }

    /// Inject a share-stop for a remote participant.
    pub fn peer_share_stop(&self, user_id: u32) {
        self.push_event(
            "peer-share-state-change",
            json!({"userId": user_id, "action": "Stop"}),
        );
    }

    /// Inject a `passively-stop-share` event.
    pub fn passively_stop_share(&self) {
        self.push_event("passively-stop-share", Value::Null);
    }

    /// Inject a `connection-change` event.
    pub fn connection_change(&self, state: &str, reason: Option<&str>) {
        let payload = match reason {
            Some(reason) => json!({"state": state, "reason": reason}),
            None => json!({"state": state}),
        };
        self.push_event("connection-change", payload);
    }

    /// Snapshot of the recorded capability calls.
    #[must_use]
    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Count of recorded calls matching `predicate`.
    #[must_use]
    pub fn call_count(&self, predicate: impl Fn(&SdkCall) -> bool) -> usize {
        self.calls()
            .iter()
            .filter(|call| predicate(call))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let (mut sdk, driver) = MockSdk::builder().build();

        sdk.init("Global", "en-US", InitOptions::default())
            .await
            .unwrap();
        sdk.leave().await.unwrap();

        assert_eq!(driver.calls(), vec![SdkCall::Init, SdkCall::Leave]);
    }

    #[tokio::test]
    async fn test_mock_join_rejects_malformed_token() {
        let (mut sdk, _driver) = MockSdk::builder().build();

        let result = sdk.join("standup", "not-a-token", "alice", None).await;
        assert!(matches!(result, Err(SdkError::JoinRejected(_))));
    }

    #[tokio::test]
    async fn test_mock_event_injection() {
        let (mut sdk, driver) = MockSdk::builder().build();

        driver.user_added(7, "bob");
        let event = sdk.next_raw_event().await.unwrap();
        assert_eq!(event.name, "user-added");
        assert_eq!(event.payload["userId"], 7);
    }

    #[tokio::test]
    async fn test_deny_multi_share_keeps_single() {
        let (mut sdk, _driver) = MockSdk::builder().deny_multi_share().build();

        sdk.set_share_privilege(SharePrivilege::MultipleShare)
            .await
            .unwrap();
        assert_eq!(sdk.share_privilege(), SharePrivilege::SingleShare);
    }
}
