//! Persisted tty → session registry.
//!
//! A flat JSON file `{"sessions": {<tty>: entry}}`. Unreadable or invalid
//! files load as empty; writes go through a sibling temp file and a rename.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use agterm_core::Session;

/// Default location of the registry file.
pub const DEFAULT_STATE_FILE: &str = "/tmp/agterm-sessions.json";

/// Remote identity of a session at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub remote_session_id: String,
    pub session_name_at_registration_time: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    #[serde(default)]
    pub sessions: BTreeMap<String, RegistryEntry>,
}

impl RegistryState {
    pub fn is_registered(&self, tty: &str) -> bool {
        self.sessions.contains_key(tty)
    }
}

/// Handle to the registry file. File IO runs on the blocking pool.
pub struct Registry {
    path: PathBuf,
    /// Serialises load+mutate+save across concurrent `register` calls.
    write_lock: Mutex<()>,
}

impl Registry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Current contents of the registry file.
    pub async fn snapshot(&self) -> io::Result<RegistryState> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_state(&path))
            .await
            .map_err(io::Error::other)
    }

    /// Record `session` under `tty`, overwriting any previous entry.
    pub async fn register(&self, tty: &str, session: &Session) -> io::Result<RegistryEntry> {
        let _guard = self.write_lock.lock().await;
        let entry = RegistryEntry {
            remote_session_id: session.session_id.clone(),
            session_name_at_registration_time: session.name.clone(),
            registered_at: Utc::now(),
        };
        let path = self.path.clone();
        let key = tty.to_string();
        let stored = entry.clone();
        tokio::task::spawn_blocking(move || {
            let mut state = read_state(&path);
            state.sessions.insert(key, stored);
            write_state(&path, &state)
        })
        .await
        .map_err(io::Error::other)??;
        tracing::info!(tty, session_id = %entry.remote_session_id, "session registered");
        Ok(entry)
    }
}

/// Never fails: a missing, unreadable or invalid file yields an empty state.
fn read_state(path: &Path) -> RegistryState {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return RegistryState::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "registry unreadable, using empty state: {e}");
            return RegistryState::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(path = %path.display(), "registry malformed, using empty state: {e}");
            RegistryState::default()
        }
    }
}

/// A crash mid-write leaves the previous file intact.
fn write_state(path: &Path, state: &RegistryState) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state).map_err(io::Error::other)?;
    let tmp = tmp_path(path);
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
