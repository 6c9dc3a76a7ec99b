//! State verification helpers.

use session_controller::actors::{SessionHandle, SessionSnapshot};
use std::time::Duration;

/// Poll the session until `predicate` holds, returning the snapshot.
///
/// Adapter events are applied asynchronously by the actor; tests use this to
/// wait for a pushed event to take effect.
///
/// # Panics
///
/// Panics if the condition is not reached within the polling budget.
pub async fn wait_until(
    handle: &SessionHandle,
    mut predicate: impl FnMut(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    let mut last = None;
    for _ in 0..200 {
        let snapshot = handle.snapshot().await.expect("session actor gone");
        if predicate(&snapshot) {
            return snapshot;
        }
        last = Some(snapshot);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached; last snapshot: {last:?}");
}
