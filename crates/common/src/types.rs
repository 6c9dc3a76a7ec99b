//! Common data types for floor-control components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-assigned participant identifier, unique within a session.
///
/// The conferencing platform assigns these on join; the controller never
/// invents one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a concurrent-share slot.
///
/// Slots are numbered from zero up to the session's share cap; the lowest
/// free index is always assigned first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(pub usize);

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId(16_778_240).to_string(), "16778240");
    }

    #[test]
    fn test_slot_index_ordering() {
        assert!(SlotIndex(0) < SlotIndex(3));
    }

    #[test]
    fn test_user_id_serde_roundtrip() {
        let id = UserId(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
