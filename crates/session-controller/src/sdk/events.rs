//! Normalization of raw SDK events into the controller's typed event set.
//!
//! The platform delivers dynamic, loosely-typed payloads. Everything is
//! normalized here, at the adapter boundary, into [`SessionEvent`] values so
//! the admission controller never touches `serde_json::Value`. Unknown event
//! names and malformed payloads are dropped with a debug log - they must not
//! reach the core.
//!
//! Payload shapes handled (one event per user):
//!
//! - `user-added`: `{ "userId": n, "displayName": s? }`
//! - `user-removed`: `{ "userId": n }`
//! - `peer-share-state-change`: `{ "userId": n, "action": "Start"|"Stop" }`
//! - `passively-stop-share`: payload ignored
//! - `connection-change`: `{ "state": "Connected"|"Reconnecting"|"Closed"|"Fail", "reason": s? }`

use super::RawSdkEvent;
use common::types::UserId;
use serde_json::Value;

/// Platform event name for a participant joining.
pub const EVENT_USER_ADDED: &str = "user-added";
/// Platform event name for a participant leaving.
pub const EVENT_USER_REMOVED: &str = "user-removed";
/// Platform event name for a remote share starting or stopping.
pub const EVENT_PEER_SHARE_STATE_CHANGE: &str = "peer-share-state-change";
/// Platform event name for the platform stopping the local share itself.
pub const EVENT_PASSIVELY_STOP_SHARE: &str = "passively-stop-share";
/// Platform event name for connection state transitions.
pub const EVENT_CONNECTION_CHANGE: &str = "connection-change";

/// Direction of a share state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    /// The participant started sharing.
    Start,
    /// The participant stopped sharing.
    Stop,
}

/// Connection state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionChange {
    /// Connection (re-)established.
    Connected,
    /// Transport is reconnecting; session state is retained.
    Reconnecting,
    /// The session ended server-side (forced disconnect).
    Closed,
    /// The connection failed irrecoverably.
    Failed,
}

/// The closed set of typed events the admission controller consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A participant joined the session.
    UserAdded {
        user_id: UserId,
        display_name: String,
    },
    /// A participant left the session.
    UserRemoved { user_id: UserId },
    /// A remote participant started or stopped sharing.
    ShareStateChanged {
        user_id: UserId,
        action: ShareAction,
    },
    /// The platform stopped the local share (e.g. the user ended capture
    /// through browser chrome rather than the session UI).
    PassivelyStopShare,
    /// The connection state changed.
    ConnectionChanged {
        state: ConnectionChange,
        reason: Option<String>,
    },
}

/// Normalize a raw platform event into a typed [`SessionEvent`].
///
/// Returns `None` for unknown event names and malformed payloads; the drop
/// is logged at debug level.
#[must_use]
pub fn normalize(raw: &RawSdkEvent) -> Option<SessionEvent> {
    match raw.name.as_str() {
        EVENT_USER_ADDED => {
            let Some(user_id) = payload_user_id(&raw.payload) else {
                return drop_event(raw, "missing or invalid userId");
            };
            let display_name = raw
                .payload
                .get("displayName")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(SessionEvent::UserAdded {
                user_id,
                display_name,
            })
        }
        EVENT_USER_REMOVED => {
            let Some(user_id) = payload_user_id(&raw.payload) else {
                return drop_event(raw, "missing or invalid userId");
            };
            Some(SessionEvent::UserRemoved { user_id })
        }
        EVENT_PEER_SHARE_STATE_CHANGE => {
            let Some(user_id) = payload_user_id(&raw.payload) else {
                return drop_event(raw, "missing or invalid userId");
            };
            let action = match raw.payload.get("action").and_then(Value::as_str) {
                Some("Start") => ShareAction::Start,
                Some("Stop") => ShareAction::Stop,
                _ => return drop_event(raw, "unrecognized share action"),
            };
            Some(SessionEvent::ShareStateChanged { user_id, action })
        }
        EVENT_PASSIVELY_STOP_SHARE => Some(SessionEvent::PassivelyStopShare),
        EVENT_CONNECTION_CHANGE => {
            let state = match raw.payload.get("state").and_then(Value::as_str) {
                Some("Connected") => ConnectionChange::Connected,
                Some("Reconnecting") => ConnectionChange::Reconnecting,
                Some("Closed") => ConnectionChange::Closed,
                Some("Fail") => ConnectionChange::Failed,
                _ => return drop_event(raw, "unrecognized connection state"),
            };
            let reason = raw
                .payload
                .get("reason")
                .and_then(Value::as_str)
                .map(ToString::to_string);
            Some(SessionEvent::ConnectionChanged { state, reason })
        }
        _ => drop_event(raw, "unknown event name"),
    }
}

fn payload_user_id(payload: &Value) -> Option<UserId> {
    payload
        .get("userId")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .map(UserId)
}

fn drop_event(raw: &RawSdkEvent, why: &str) -> Option<SessionEvent> {
    tracing::debug!(
        target: "sc.sdk.events",
        event = %raw.name,
        why = why,
        "Dropping platform event"
    );
    None
}
