//! Operation surface shared by the MCP tools and the CLI subcommands.
//!
//! Every operation re-fetches the live session list; nothing about a session
//! is cached between calls. Bridge calls are synchronous and run on the
//! blocking pool.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use agterm_bridge::{
    ActionStatus, BridgeError, ColorScheme, CreatedSession, NewSessionOptions, ScriptRunner,
    SplitDirection,
};
use agterm_core::{NotFoundError, ScoredSession, Session, last_lines, normalize_snapshot, scrub};

use crate::registry::{Registry, RegistryEntry};
use crate::watch::WatchTracker;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("registry write failed: {0}")]
    Registry(#[from] std::io::Error),

    #[error("bridge task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A live session annotated with its registry status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedSession {
    #[serde(flatten)]
    pub session: Session,
    pub registered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registered {
    pub status: &'static str,
    pub tty: String,
    #[serde(flatten)]
    pub entry: RegistryEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRead {
    pub session_id: String,
    pub name: String,
    pub line_count: usize,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchRead {
    pub session_id: String,
    pub name: String,
    pub is_first_read: bool,
    pub new_line_count: usize,
    pub new_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusOutcome {
    pub status: ActionStatus,
    pub session_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub status: ActionStatus,
    pub session_id: String,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub status: ActionStatus,
    pub session_id: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeysOutcome {
    pub status: ActionStatus,
    pub session_id: String,
    pub keys: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    pub status: &'static str,
    #[serde(flatten)]
    pub session: CreatedSession,
}

impl From<CreatedSession> for Created {
    fn from(session: CreatedSession) -> Self {
        Self {
            status: "created",
            session,
        }
    }
}

/// Handle to the terminal application plus the process-wide state.
#[derive(Clone)]
pub struct Terminals {
    runner: Arc<dyn ScriptRunner>,
    registry: Arc<Registry>,
    watches: Arc<WatchTracker>,
}

impl Terminals {
    pub fn new(
        runner: Arc<dyn ScriptRunner>,
        registry: Arc<Registry>,
        watches: Arc<WatchTracker>,
    ) -> Self {
        Self {
            runner,
            registry,
            watches,
        }
    }

    /// Run a synchronous bridge call on the blocking pool.
    async fn bridge<T, F>(&self, call: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ScriptRunner) -> Result<T, BridgeError> + Send + 'static,
    {
        let runner = Arc::clone(&self.runner);
        let value = tokio::task::spawn_blocking(move || call(runner.as_ref())).await??;
        Ok(value)
    }

    /// Fresh snapshot of every live session.
    pub async fn sessions(&self) -> Result<Vec<Session>, ServiceError> {
        self.bridge(|runner| agterm_bridge::list_sessions(runner))
            .await
    }

    /// Resolve an id, tty or name to one live session.
    pub async fn resolve(&self, identifier: &str) -> Result<Session, ServiceError> {
        let sessions = self.sessions().await?;
        let resolution = agterm_core::resolve(identifier, &sessions)?;
        tracing::debug!(
            identifier,
            session_id = %resolution.session.session_id,
            matched_by = ?resolution.matched_by,
            "resolved session"
        );
        Ok(resolution.session.clone())
    }

    pub async fn list_sessions(&self) -> Result<Vec<ListedSession>, ServiceError> {
        let sessions = self.sessions().await?;
        let state = self.registry.snapshot().await?;
        Ok(sessions
            .into_iter()
            .map(|session| ListedSession {
                registered: state.is_registered(&session.tty),
                session,
            })
            .collect())
    }

    /// Best-first name matches, at most five.
    pub async fn find_by_name(&self, query: &str) -> Result<Vec<ScoredSession>, ServiceError> {
        let sessions = self.sessions().await?;
        Ok(agterm_core::find_by_name(query, &sessions)?)
    }

    /// Record the live session on `tty` in the registry. Only an exact tty
    /// match counts.
    pub async fn register(&self, tty: &str) -> Result<Registered, ServiceError> {
        let sessions = self.sessions().await?;
        let session = sessions
            .iter()
            .find(|s| s.tty == tty)
            .ok_or_else(|| NotFoundError::new(tty, &sessions))?;
        let entry = self.registry.register(tty, session).await?;
        Ok(Registered {
            status: "registered",
            tty: tty.to_string(),
            entry,
        })
    }

    /// The last `max_lines` non-trailing-blank lines of a session's buffer.
    pub async fn read_output(
        &self,
        identifier: &str,
        max_lines: usize,
    ) -> Result<OutputRead, ServiceError> {
        let session = self.resolve(identifier).await?;
        let raw = self.read_contents(&session.session_id).await?;
        let clean = scrub(&raw);
        let lines = last_lines(&clean, max_lines);
        Ok(OutputRead {
            session_id: session.session_id,
            name: session.name,
            line_count: lines.len(),
            output: lines.join("\n"),
        })
    }

    /// Text that appeared since the previous watch of the same session.
    pub async fn watch(&self, identifier: &str) -> Result<WatchRead, ServiceError> {
        let session = self.resolve(identifier).await?;
        // Held across the read so cursor updates land in completion order.
        let mut cursor = self.watches.cursor(&session.session_id).await;
        let raw = self.read_contents(&session.session_id).await?;
        let delta = cursor.observe(&normalize_snapshot(&raw));
        drop(cursor);

        tracing::debug!(
            session_id = %session.session_id,
            first = delta.is_first_read,
            new_lines = delta.line_count(),
            "watch observed"
        );
        Ok(WatchRead {
            session_id: session.session_id,
            name: session.name,
            is_first_read: delta.is_first_read,
            new_line_count: delta.line_count(),
            new_output: delta.text,
        })
    }

    pub async fn focus(&self, identifier: &str) -> Result<FocusOutcome, ServiceError> {
        let session = self.resolve(identifier).await?;
        let sid = session.session_id.clone();
        let status = self
            .bridge(move |runner| agterm_bridge::focus_session(runner, &sid))
            .await?;
        Ok(FocusOutcome {
            status,
            session_id: session.session_id,
            name: session.name,
        })
    }

    pub async fn rename(
        &self,
        identifier: &str,
        new_name: &str,
    ) -> Result<RenameOutcome, ServiceError> {
        let session = self.resolve(identifier).await?;
        let (sid, name) = (session.session_id.clone(), new_name.to_string());
        let status = self
            .bridge(move |runner| agterm_bridge::rename_session(runner, &sid, &name))
            .await?;
        Ok(RenameOutcome {
            status,
            session_id: session.session_id,
            old_name: session.name,
            new_name: new_name.to_string(),
        })
    }

    /// Type `command` followed by Enter.
    pub async fn send_command(
        &self,
        identifier: &str,
        command: &str,
    ) -> Result<CommandOutcome, ServiceError> {
        let session = self.resolve(identifier).await?;
        let (sid, text) = (session.session_id.clone(), command.to_string());
        let status = self
            .bridge(move |runner| agterm_bridge::send_text(runner, &sid, &text))
            .await?;
        Ok(CommandOutcome {
            status,
            session_id: session.session_id,
            command: command.to_string(),
        })
    }

    pub async fn send_keys(&self, identifier: &str, keys: &str) -> Result<KeysOutcome, ServiceError> {
        let session = self.resolve(identifier).await?;
        let (sid, key_list) = (session.session_id.clone(), keys.to_string());
        let status = self
            .bridge(move |runner| agterm_bridge::send_keys(runner, &sid, &key_list))
            .await?;
        Ok(KeysOutcome {
            status,
            session_id: session.session_id,
            keys: keys.to_string(),
        })
    }

    /// Open a tab in the window holding `window_identifier`, or the first
    /// window, and mark it with the background-task colour.
    pub async fn new_tab(
        &self,
        options: NewSessionOptions,
        window_identifier: Option<&str>,
    ) -> Result<Created, ServiceError> {
        let window_id = match window_identifier {
            Some(identifier) => Some(self.resolve(identifier).await?.window_id),
            None => None,
        };
        let created = self
            .bridge(move |runner| {
                agterm_bridge::create_tab(runner, window_id.as_deref(), &options)
            })
            .await?;
        tracing::info!(session_id = %created.session_id, tty = %created.tty, "tab created");
        self.mark(&created, ColorScheme::BackgroundTask).await;
        Ok(created.into())
    }

    /// Split the session `identifier` (or the first window's current
    /// session) and mark the new pane with the split-pane colour.
    pub async fn split_pane(
        &self,
        direction: &str,
        options: NewSessionOptions,
        identifier: Option<&str>,
    ) -> Result<Created, ServiceError> {
        let direction: SplitDirection = direction.parse().map_err(ServiceError::InvalidArgument)?;
        let target = match identifier {
            Some(identifier) => Some(self.resolve(identifier).await?),
            None => None,
        };
        let target_id = target.as_ref().map(|s| s.session_id.clone());
        let created = self
            .bridge(move |runner| {
                agterm_bridge::split_session(runner, target_id.as_deref(), direction, &options)
            })
            .await?;
        let Some(created) = created else {
            // The target closed between resolution and the split.
            let identifier = identifier.unwrap_or_default();
            return Err(NotFoundError::new(identifier, target.as_slice()).into());
        };
        tracing::info!(session_id = %created.session_id, tty = %created.tty, "pane created");
        self.mark(&created, ColorScheme::SplitPane).await;
        Ok(created.into())
    }

    async fn read_contents(&self, session_id: &str) -> Result<String, ServiceError> {
        let sid = session_id.to_string();
        self.bridge(move |runner| agterm_bridge::read_contents(runner, &sid))
            .await
    }

    /// Best-effort tab colour; failures are logged, never returned.
    async fn mark(&self, created: &CreatedSession, scheme: ColorScheme) {
        if created.tty.is_empty() {
            tracing::warn!(session_id = %created.session_id, "no tty for new session, skipping tab colour");
            return;
        }
        let tty = created.tty.clone();
        let color = scheme.tab_color();
        let result =
            tokio::task::spawn_blocking(move || agterm_bridge::apply_tab_color(&tty, color)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(tty = %created.tty, "tab colour not applied: {e}"),
            Err(e) => tracing::warn!(tty = %created.tty, "tab colour task failed: {e}"),
        }
    }
}
