//! Identifier → session resolution over a live session list.
//!
//! Resolution order, first hit wins:
//! 1. exact `session_id`
//! 2. exact `tty`
//! 3. best fuzzy match on `name`
//!
//! The exact stages short-circuit before any fuzzy scoring, so a session that
//! happens to be named after another session's id or tty never shadows it.

use serde::Serialize;

use crate::fuzzy::rank;
use crate::types::{NotFoundError, Session};

/// Maximum number of sessions returned by [`find_by_name`].
pub const FIND_LIMIT: usize = 5;

/// Which resolution stage produced the match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchedBy {
    SessionId,
    Tty,
    Name { score: f64 },
}

/// A resolved session plus the stage that matched it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub session: &'a Session,
    pub matched_by: MatchedBy,
}

/// Resolve `identifier` against `sessions`.
pub fn resolve<'a>(
    identifier: &str,
    sessions: &'a [Session],
) -> Result<Resolution<'a>, NotFoundError> {
    if let Some(session) = sessions.iter().find(|s| s.session_id == identifier) {
        return Ok(Resolution {
            session,
            matched_by: MatchedBy::SessionId,
        });
    }

    if let Some(session) = sessions.iter().find(|s| s.tty == identifier) {
        return Ok(Resolution {
            session,
            matched_by: MatchedBy::Tty,
        });
    }

    rank(identifier, sessions, |s| s.name.as_str())
        .into_iter()
        .next()
        .map(|m| Resolution {
            session: m.candidate,
            matched_by: MatchedBy::Name { score: m.score },
        })
        .ok_or_else(|| NotFoundError::new(identifier, sessions))
}

/// A session with the fuzzy score it earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSession {
    pub score: f64,
    #[serde(flatten)]
    pub session: Session,
}

/// Fuzzy search by name, best-first, capped at [`FIND_LIMIT`].
///
/// Returns `NotFoundError` instead of an empty list.
pub fn find_by_name(query: &str, sessions: &[Session]) -> Result<Vec<ScoredSession>, NotFoundError> {
    let found: Vec<ScoredSession> = rank(query, sessions, |s| s.name.as_str())
        .into_iter()
        .take(FIND_LIMIT)
        .map(|m| ScoredSession {
            score: m.score,
            session: m.candidate.clone(),
        })
        .collect();
    if found.is_empty() {
        return Err(NotFoundError::new(query, sessions));
    }
    Ok(found)
}
