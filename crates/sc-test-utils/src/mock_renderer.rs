//! Renderer binding that records every notification.

use common::types::{SlotIndex, UserId};
use session_controller::renderer::{MediaSource, RendererBinding};
use std::sync::{Arc, Mutex};

/// A recorded renderer notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererCall {
    Assigned {
        user_id: UserId,
        slot_index: SlotIndex,
        /// Whether the media source was the local capture.
        local: bool,
    },
    Freed {
        user_id: UserId,
        slot_index: SlotIndex,
    },
}

/// Renderer binding handed to the actor; records into a shared log.
#[derive(Debug)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<RendererCall>>>,
}

impl RecordingRenderer {
    /// Create a renderer and the log used to inspect it from the test.
    #[must_use]
    pub fn new() -> (Self, RendererLog) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            RendererLog { calls },
        )
    }
}

impl RendererBinding for RecordingRenderer {
    fn on_slot_assigned(&mut self, user_id: UserId, slot_index: SlotIndex, source: &MediaSource) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RendererCall::Assigned {
                user_id,
                slot_index,
                local: matches!(source, MediaSource::Local(_)),
            });
        }
    }

    fn on_slot_freed(&mut self, user_id: UserId, slot_index: SlotIndex) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RendererCall::Freed {
                user_id,
                slot_index,
            });
        }
    }
}

/// Inspection side of a [`RecordingRenderer`].
#[derive(Debug, Clone)]
pub struct RendererLog {
    calls: Arc<Mutex<Vec<RendererCall>>>,
}

impl RendererLog {
    /// Snapshot of the recorded notifications, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RendererCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of slot-assigned notifications.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RendererCall::Assigned { .. }))
            .count()
    }

    /// Number of slot-freed notifications.
    #[must_use]
    pub fn freed_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RendererCall::Freed { .. }))
            .count()
    }
}
