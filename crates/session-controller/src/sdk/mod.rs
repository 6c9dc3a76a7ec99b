//! Session client adapter: the capability surface consumed from the external
//! conferencing SDK.
//!
//! The SDK is the sole conduit for remote session state. The controller
//! consumes it through [`SdkCapability`], a closed capability interface
//! supplied by the embedding application's platform bridge, and never assumes
//! any hidden synchronization beyond it.
//!
//! Raw events arrive as loosely-typed name/payload pairs
//! ([`RawSdkEvent`]) and are normalized into the closed typed set in
//! [`events`] before anything downstream sees them.

pub mod events;

use async_trait::async_trait;
use common::types::UserId;
use serde_json::Value;
use thiserror::Error;

/// Session-wide share privilege setting.
///
/// `MultipleShare` must be established once per session before more than one
/// participant can legitimately hold the floor at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePrivilege {
    /// Only one participant may share at a time (platform default).
    SingleShare,
    /// Multiple participants may share simultaneously.
    MultipleShare,
}

/// Options handed to the SDK's init capability.
#[derive(Debug, Clone, Copy)]
pub struct InitOptions {
    /// Ask the platform to enforce simultaneous video rendering support.
    pub enforce_multiple_videos: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            enforce_multiple_videos: true,
        }
    }
}

/// Opaque rendering surface the local screen capture is written into.
///
/// The element identifiers are owned by the embedding application; the
/// controller only passes them through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareSurface {
    /// A video element handle.
    Video(String),
    /// A canvas element handle (fallback when video-element capture is not
    /// available).
    Canvas(String),
}

impl ShareSurface {
    /// The underlying element identifier.
    #[must_use]
    pub fn element_id(&self) -> &str {
        match self {
            ShareSurface::Video(id) | ShareSurface::Canvas(id) => id,
        }
    }
}

/// The local user as reported by a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUser {
    /// Platform-assigned user id.
    pub user_id: UserId,
    /// Display name echoed back by the platform.
    pub display_name: String,
}

/// A raw, loosely-typed event as delivered by the platform bridge.
///
/// Payload shapes are owned by the platform; [`events::normalize`] is the
/// only reader.
#[derive(Debug, Clone)]
pub struct RawSdkEvent {
    /// Platform event name (e.g. `peer-share-state-change`).
    pub name: String,
    /// Dynamic payload.
    pub payload: Value,
}

/// Errors surfaced by the SDK capability.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Connecting or initializing the platform failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The platform rejected the join (bad/expired token, locked session).
    #[error("join rejected: {0}")]
    JoinRejected(String),

    /// Any other capability call failed.
    #[error("operation failed: {0}")]
    Operation(String),
}

/// Capability interface of the external conferencing SDK.
///
/// One implementation exists per session and is owned exclusively by the
/// session actor. Event delivery through [`SdkCapability::next_raw_event`]
/// is a single ordered stream: the platform bridge is responsible for
/// funneling its internal callbacks into arrival order, and the actor
/// processes them one at a time.
#[async_trait]
pub trait SdkCapability: Send {
    /// Initialize the platform (dependency assets, language, options).
    async fn init(
        &mut self,
        dependency_asset_path: &str,
        language: &str,
        options: InitOptions,
    ) -> Result<(), SdkError>;

    /// Join the named session with a signed credential token.
    async fn join(
        &mut self,
        session_name: &str,
        token: &str,
        user_name: &str,
        password: Option<&str>,
    ) -> Result<LocalUser, SdkError>;

    /// Leave the session.
    async fn leave(&mut self) -> Result<(), SdkError>;

    /// Establish the session-wide share privilege.
    async fn set_share_privilege(&mut self, privilege: SharePrivilege) -> Result<(), SdkError>;

    /// The share privilege the platform currently reports.
    fn share_privilege(&self) -> SharePrivilege;

    /// Start capturing the local screen into `surface`.
    async fn start_share_screen(&mut self, surface: &ShareSurface) -> Result<(), SdkError>;

    /// Stop the local screen capture.
    async fn stop_share_screen(&mut self) -> Result<(), SdkError>;

    /// Start a cloud recording of the session.
    async fn start_cloud_recording(&mut self) -> Result<(), SdkError>;

    /// Pause an in-progress cloud recording.
    async fn pause_cloud_recording(&mut self) -> Result<(), SdkError>;

    /// Resume a paused cloud recording.
    async fn resume_cloud_recording(&mut self) -> Result<(), SdkError>;

    /// Stop the cloud recording.
    async fn stop_cloud_recording(&mut self) -> Result<(), SdkError>;

    /// Next raw event in arrival order; `None` when the stream has closed.
    async fn next_raw_event(&mut self) -> Option<RawSdkEvent>;
}
