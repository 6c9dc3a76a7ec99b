//! Share-slot admission controller.
//!
//! Owns the participant registry and the set of active share slots - the one
//! resource contended by the local user and every remote participant. All
//! operations are synchronous with respect to the calling event: a decision
//! never suspends, so capacity is always evaluated at the instant of the
//! request.
//!
//! The cap is enforced against the global session view. Remote-originated
//! share-starts take the same path as local requests; even when the platform
//! is expected to enforce the same limit, each request is re-admitted here
//! rather than trusted.

use common::types::{SlotIndex, UserId};
use std::collections::HashMap;

/// Maximum number of simultaneously active share slots.
pub const MAX_CONCURRENT_SHARES: usize = 4;

/// A participant registered in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Platform-assigned user id.
    pub user_id: UserId,
    /// Display name at join time.
    pub display_name: String,
    /// Whether this participant currently holds a share slot.
    pub is_sharing: bool,
}

/// An active share slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareSlot {
    /// The sharer holding the slot.
    pub user_id: UserId,
    /// Slot position, `0..MAX_CONCURRENT_SHARES`.
    pub slot_index: SlotIndex,
    /// When the share was admitted (Unix epoch seconds).
    pub started_at: i64,
}

/// Reason a share-start request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// All share slots are occupied.
    AtCapacity,
    /// The requester already holds a slot.
    AlreadySharing,
    /// The requester is not a registered participant.
    UnknownParticipant,
}

/// Outcome of a share-start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Admitted into the given slot.
    Admitted(SlotIndex),
    /// Denied; session state is unchanged.
    Rejected(RejectReason),
}

/// The admission controller.
///
/// Sole mutator of the participant registry and the slot set. Slot storage
/// is a fixed array so the capacity invariant and the lowest-free-index
/// assignment rule are structural rather than checked.
#[derive(Debug, Default)]
pub struct AdmissionController {
    participants: HashMap<UserId, Participant>,
    slots: [Option<ShareSlot>; MAX_CONCURRENT_SHARES],
}

impl AdmissionController {
    /// Create an empty controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant. Idempotent: re-registration of a known user
    /// id leaves existing state untouched.
    ///
    /// Returns `true` if the participant was newly registered.
    pub fn on_participant_joined(&mut self, user_id: UserId, display_name: String) -> bool {
        if self.participants.contains_key(&user_id) {
            return false;
        }
        self.participants.insert(
            user_id,
            Participant {
                user_id,
                display_name,
                is_sharing: false,
            },
        );
        tracing::debug!(
            target: "sc.admission",
            user_id = %user_id,
            total_participants = self.participants.len(),
            "Participant registered"
        );
        true
    }

    /// Remove a participant and release its slot, if it held one.
    ///
    /// Returns the freed slot so the caller can notify the renderer.
    pub fn on_participant_left(&mut self, user_id: UserId) -> Option<ShareSlot> {
        let existed = self.participants.remove(&user_id).is_some();
        let freed = self.release_slot(user_id);
        if existed {
            tracing::debug!(
                target: "sc.admission",
                user_id = %user_id,
                freed_slot = freed.map(|s| s.slot_index.0),
                total_participants = self.participants.len(),
                "Participant removed"
            );
        }
        freed
    }

    /// Decide a share-start request.
    ///
    /// Admits iff the requester is registered, holds no slot, and capacity
    /// remains; on admission the lowest free slot index is assigned and
    /// `started_at` is recorded from `now`. Local and remote requests are
    /// evaluated by this identical rule.
    pub fn on_share_start_requested(&mut self, user_id: UserId, now: i64) -> AdmissionDecision {
        // Invariant: no slot may exist for an unregistered user id.
        if !self.participants.contains_key(&user_id) {
            return AdmissionDecision::Rejected(RejectReason::UnknownParticipant);
        }

        if self.slot_of(user_id).is_some() {
            return AdmissionDecision::Rejected(RejectReason::AlreadySharing);
        }

        // Lowest free index wins; the array makes the tie-break deterministic.
        let Some((index, free)) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
        else {
            return AdmissionDecision::Rejected(RejectReason::AtCapacity);
        };

        let slot_index = SlotIndex(index);
        *free = Some(ShareSlot {
            user_id,
            slot_index,
            started_at: now,
        });

        if let Some(participant) = self.participants.get_mut(&user_id) {
            participant.is_sharing = true;
        }

        tracing::debug!(
            target: "sc.admission",
            user_id = %user_id,
            slot = slot_index.0,
            active_shares = self.active_share_count(),
            "Share admitted"
        );

        AdmissionDecision::Admitted(slot_index)
    }

    /// Release the slot held by `user_id`, if any. Idempotent.
    ///
    /// Returns the freed slot so the caller can notify the renderer.
    pub fn on_share_stopped(&mut self, user_id: UserId) -> Option<ShareSlot> {
        self.release_slot(user_id)
    }

    /// Drop all participants and slots in one step.
    ///
    /// Returns the slots that were active so the caller can emit freed
    /// notifications atomically with the owning state transition.
    pub fn clear(&mut self) -> Vec<ShareSlot> {
        self.participants.clear();
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    /// Number of active share slots.
    #[must_use]
    pub fn active_share_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Number of registered participants.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Whether `user_id` currently holds a share slot.
    #[must_use]
    pub fn is_sharing(&self, user_id: UserId) -> bool {
        self.slot_of(user_id).is_some()
    }

    /// Snapshot of registered participants (unordered).
    #[must_use]
    pub fn participants(&self) -> Vec<Participant> {
        self.participants.values().cloned().collect()
    }

    /// Snapshot of active slots, ordered by slot index.
    #[must_use]
    pub fn share_slots(&self) -> Vec<ShareSlot> {
        self.slots.iter().flatten().copied().collect()
    }

    fn slot_of(&self, user_id: UserId) -> Option<ShareSlot> {
        self.slots
            .iter()
            .flatten()
            .find(|slot| slot.user_id == user_id)
            .copied()
    }

    fn release_slot(&mut self, user_id: UserId) -> Option<ShareSlot> {
        let freed = self
            .slots
            .iter_mut()
            .find(|slot| slot.map(|s| s.user_id) == Some(user_id))
            .and_then(Option::take);

        if freed.is_some() {
            if let Some(participant) = self.participants.get_mut(&user_id) {
                participant.is_sharing = false;
            }
            tracing::debug!(
                target: "sc.admission",
                user_id = %user_id,
                active_shares = self.active_share_count(),
                "Share slot released"
            );
        }
        freed
    }
}
