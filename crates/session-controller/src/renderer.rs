//! Renderer binding interface.
//!
//! The renderer is an external collaborator: it attaches and detaches video
//! surfaces in response to slot changes but owns no session state. It holds
//! only weak references to participants - lookups go by user id, and a freed
//! notification is the signal to drop whatever was attached.

use crate::sdk::ShareSurface;
use common::types::{SlotIndex, UserId};

/// Where the media for an assigned slot comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// The local screen capture, already bound to this surface.
    Local(ShareSurface),
    /// A remote stream; the renderer attaches its view by user id through
    /// the platform's view API.
    Remote,
}

/// Receiver of slot-assignment and slot-freed notifications.
///
/// Called synchronously from the session actor's dispatch loop;
/// implementations must not block.
pub trait RendererBinding: Send {
    /// A share slot was assigned to `user_id`.
    fn on_slot_assigned(&mut self, user_id: UserId, slot_index: SlotIndex, source: &MediaSource);

    /// The share slot previously held by `user_id` was freed.
    fn on_slot_freed(&mut self, user_id: UserId, slot_index: SlotIndex);
}

/// Renderer binding that ignores all notifications.
///
/// For hosts that defer visual binding (or headless use).
#[derive(Debug, Default, Clone, Copy)]
pub struct NopRenderer;

impl RendererBinding for NopRenderer {
    fn on_slot_assigned(&mut self, _user_id: UserId, _slot_index: SlotIndex, _source: &MediaSource) {}

    fn on_slot_freed(&mut self, _user_id: UserId, _slot_index: SlotIndex) {}
}
