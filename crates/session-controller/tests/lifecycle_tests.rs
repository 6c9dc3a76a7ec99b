//! Integration tests for the session lifecycle state machine, driven
//! through a scripted platform mock.

use sc_test_utils::assertions::wait_until;
use sc_test_utils::fixtures::{
    test_config, test_config_with, TEST_SDK_KEY, TEST_SDK_SECRET, TEST_SESSION_NAME,
};
use sc_test_utils::{MockSdk, RecordingRenderer, SdkCall};
use session_controller::actors::{SessionActor, SessionState};
use session_controller::credential::{self, Role, SessionIdentity};
use session_controller::errors::ControllerError;
use session_controller::recording::RecordingState;
use session_controller::sdk::{SdkCapability, SdkError, SharePrivilege};
use std::time::Duration;

use common::secret::SecretString;

#[tokio::test]
async fn start_reaches_joined_and_elevates_privilege() {
    let (sdk, driver) = MockSdk::builder().local_user(101, "alice").build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("start should succeed");

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.state, SessionState::Joined);
    assert!(snapshot.multi_share_elevated);
    assert_eq!(snapshot.local_user.map(|u| u.0), Some(101));
    // The local user is registered as a participant like any other.
    assert_eq!(snapshot.participants.len(), 1);

    let calls = driver.calls();
    assert_eq!(
        calls,
        vec![
            SdkCall::Init,
            SdkCall::Join {
                session_name: TEST_SESSION_NAME.to_string(),
                user_name: "alice".to_string(),
                with_password: false,
            },
            SdkCall::SetSharePrivilege(SharePrivilege::MultipleShare),
        ]
    );
}

#[tokio::test]
async fn leave_before_joined_cancels_startup() {
    let (sdk, driver) = MockSdk::builder().stall_join().build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    let starter = handle.clone();
    let start_task = tokio::spawn(async move { starter.start().await });

    // Let the start reach its stalled join before cancelling it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.leave().await.expect("leave should succeed");

    let start_result = start_task.await.expect("start task must not panic");
    assert!(matches!(start_result, Err(ControllerError::Cancelled)));

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.state, SessionState::Left);
    assert!(snapshot.participants.is_empty());
    assert!(snapshot.share_slots.is_empty());

    // The join was attempted, but no leave reaches the platform for a
    // session that was never joined.
    assert_eq!(driver.call_count(|c| matches!(c, SdkCall::Leave)), 0);
}

#[tokio::test]
async fn stale_credential_is_not_presented_to_join() {
    // A 10-second validity window is inside the staleness margin, so the
    // controller must refuse to attempt the join at all.
    let config = test_config_with(&[("CREDENTIAL_TTL_SECONDS", "10")]);
    let (sdk, driver) = MockSdk::builder().build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(config, sdk, Box::new(renderer));

    let result = handle.start().await;
    assert!(matches!(result, Err(ControllerError::StaleCredential)));

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert!(matches!(snapshot.state, SessionState::Failed { .. }));
    assert_eq!(driver.call_count(|c| matches!(c, SdkCall::Join { .. })), 0);
}

#[tokio::test]
async fn expired_token_is_rejected_by_the_join_operation() {
    // The platform-side check is the authoritative backstop: present an
    // already-expired token straight to the stub join.
    let identity = SessionIdentity {
        session_name: TEST_SESSION_NAME.to_string(),
        user_identity: "alice".to_string(),
        role: Role::Host,
    };
    let long_ago = chrono::Utc::now().timestamp() - 10_000;
    let expired = credential::generate(
        &identity,
        TEST_SDK_KEY,
        &SecretString::from(TEST_SDK_SECRET),
        Duration::from_secs(7200),
        || long_ago,
    )
    .expect("generation succeeds even for past timestamps");

    let (mut sdk, _driver) = MockSdk::builder().build();
    let result = sdk
        .join(TEST_SESSION_NAME, &expired.token, "alice", None)
        .await;

    assert!(matches!(result, Err(SdkError::JoinRejected(reason)) if reason.contains("expired")));
}

#[tokio::test]
async fn join_rejection_fails_the_session() {
    let (sdk, _driver) = MockSdk::builder().reject_join("session locked").build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    let result = handle.start().await;
    assert!(matches!(result, Err(ControllerError::JoinRejected(_))));

    let snapshot = handle.snapshot().await.expect("snapshot");
    match snapshot.state {
        SessionState::Failed { reason } => assert!(reason.contains("session locked")),
        other => panic!("expected Failed, got {other}"),
    }
}

#[tokio::test]
async fn connection_failure_fails_the_session() {
    let (sdk, _driver) = MockSdk::builder().fail_init("network down").build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    let result = handle.start().await;
    assert!(matches!(result, Err(ControllerError::Connection(_))));

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert!(matches!(snapshot.state, SessionState::Failed { .. }));
}

#[tokio::test]
async fn second_start_is_rejected() {
    let (sdk, _driver) = MockSdk::builder().build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("first start succeeds");
    let result = handle.start().await;
    assert!(matches!(result, Err(ControllerError::InvalidState { .. })));
}

#[tokio::test]
async fn explicit_leave_clears_everything() {
    let (sdk, driver) = MockSdk::builder().local_user(101, "alice").build();
    let (renderer, log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("start succeeds");
    driver.user_added(202, "bob");
    driver.peer_share_start(202);
    wait_until(&handle, |s| s.share_slots.len() == 1).await;

    handle.leave().await.expect("leave succeeds");

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.state, SessionState::Left);
    assert!(snapshot.participants.is_empty());
    assert!(snapshot.share_slots.is_empty());
    assert_eq!(snapshot.recording, RecordingState::Idle);
    assert_eq!(driver.call_count(|c| matches!(c, SdkCall::Leave)), 1);
    // The slot active at leave time was reported freed.
    assert_eq!(log.freed_count(), 1);
}

#[tokio::test]
async fn leave_is_idempotent() {
    let (sdk, _driver) = MockSdk::builder().build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("start succeeds");
    handle.leave().await.expect("first leave succeeds");
    handle.leave().await.expect("second leave is a no-op");

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.state, SessionState::Left);
}

#[tokio::test]
async fn forced_disconnect_clears_state_and_preserves_reason() {
    let (sdk, driver) = MockSdk::builder().local_user(101, "alice").build();
    let (renderer, log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("start succeeds");
    driver.user_added(202, "bob");
    driver.peer_share_start(202);
    wait_until(&handle, |s| s.share_slots.len() == 1).await;

    driver.connection_change("Fail", Some("kicked by host"));
    let snapshot =
        wait_until(&handle, |s| matches!(s.state, SessionState::Failed { .. })).await;

    match snapshot.state {
        SessionState::Failed { reason } => assert!(reason.contains("kicked by host")),
        other => panic!("expected Failed, got {other}"),
    }
    assert!(snapshot.participants.is_empty());
    assert!(snapshot.share_slots.is_empty());
    assert_eq!(log.freed_count(), 1);
}

#[tokio::test]
async fn platform_closed_session_lands_in_left() {
    let (sdk, driver) = MockSdk::builder().build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("start succeeds");
    driver.connection_change("Closed", None);

    let snapshot = wait_until(&handle, |s| s.state == SessionState::Left).await;
    assert!(snapshot.participants.is_empty());
}

#[tokio::test]
async fn unconfirmed_multi_share_privilege_is_tolerated() {
    let (sdk, _driver) = MockSdk::builder().deny_multi_share().build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("start still succeeds");

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.state, SessionState::Joined);
    assert!(!snapshot.multi_share_elevated);
}

#[tokio::test]
async fn recording_lifecycle_toggles_and_stays_non_fatal() {
    let (sdk, driver) = MockSdk::builder().build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("start succeeds");

    handle.start_recording().await.expect("start recording");
    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.recording, RecordingState::Recording);

    handle.pause_or_resume_recording().await.expect("pause");
    assert_eq!(
        handle.snapshot().await.expect("snapshot").recording,
        RecordingState::Paused
    );

    handle.pause_or_resume_recording().await.expect("resume");
    assert_eq!(
        handle.snapshot().await.expect("snapshot").recording,
        RecordingState::Recording
    );

    handle.stop_recording().await.expect("stop");
    assert_eq!(
        handle.snapshot().await.expect("snapshot").recording,
        RecordingState::Idle
    );

    // Stopping again is denied, and the session is untouched.
    let result = handle.stop_recording().await;
    assert!(matches!(result, Err(ControllerError::Recording(_))));
    assert_eq!(
        handle.snapshot().await.expect("snapshot").state,
        SessionState::Joined
    );

    assert_eq!(
        driver.call_count(|c| matches!(
            c,
            SdkCall::StartCloudRecording
                | SdkCall::PauseCloudRecording
                | SdkCall::ResumeCloudRecording
                | SdkCall::StopCloudRecording
        )),
        4
    );
}

#[tokio::test]
async fn recording_requires_joined_state() {
    let (sdk, _driver) = MockSdk::builder().build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    let result = handle.start_recording().await;
    assert!(matches!(result, Err(ControllerError::InvalidState { .. })));
}

#[tokio::test]
async fn failed_recording_call_does_not_change_state() {
    let (sdk, _driver) = MockSdk::builder().fail_recording("no privilege").build();
    let (renderer, _log) = RecordingRenderer::new();
    let (handle, _task) = SessionActor::spawn(test_config(), sdk, Box::new(renderer));

    handle.start().await.expect("start succeeds");

    let result = handle.start_recording().await;
    assert!(matches!(result, Err(ControllerError::Recording(_))));

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.recording, RecordingState::Idle);
    assert_eq!(snapshot.state, SessionState::Joined);
}
