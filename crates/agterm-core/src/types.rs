use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Session ──────────────────────────────────────────────────────

/// One live terminal session as reported by the terminal application.
///
/// A session value is a point-in-time snapshot. Lists are re-fetched for
/// every operation; a `session_id` seen earlier may no longer be live.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Opaque id assigned by the terminal application. Unique among live sessions only.
    pub session_id: String,
    /// Display label. Mutable and not unique.
    pub name: String,
    /// Device path, e.g. `/dev/ttys004`. Reused by the OS once the session closes.
    pub tty: String,
    pub window_id: String,
    pub window_name: String,
    /// 1-based tab position inside the window.
    pub tab_index: u32,
}

// ─── Errors ───────────────────────────────────────────────────────

/// No live session matched an identifier.
///
/// Carries every currently visible name so the caller can retry with a
/// better identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no session found matching '{identifier}'; available sessions: {available:?}")]
pub struct NotFoundError {
    pub identifier: String,
    pub available: Vec<String>,
}

impl NotFoundError {
    pub fn new(identifier: impl Into<String>, sessions: &[Session]) -> Self {
        Self {
            identifier: identifier.into(),
            available: sessions.iter().map(|s| s.name.clone()).collect(),
        }
    }
}
