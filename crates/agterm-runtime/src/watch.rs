//! Per-session watch cursors shared across concurrent requests.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use agterm_core::WatchCursor;

/// Owns one [`WatchCursor`] per session id for the life of the process.
///
/// Each cursor sits behind its own lock. A watcher holds that lock from
/// before it reads the buffer until after it has updated the cursor, so two
/// watches of one session never interleave. Different sessions never
/// contend.
#[derive(Default)]
pub struct WatchTracker {
    cursors: Mutex<HashMap<String, Arc<Mutex<WatchCursor>>>>,
}

impl WatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the cursor for `session_id`, creating an unseen one if needed.
    pub async fn cursor(&self, session_id: &str) -> OwnedMutexGuard<WatchCursor> {
        let slot = {
            let mut cursors = self.cursors.lock().await;
            Arc::clone(cursors.entry(session_id.to_string()).or_default())
        };
        slot.lock_owned().await
    }
}
