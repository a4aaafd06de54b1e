//! Session actions: focus, rename, typing, and creating tabs or panes.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::BridgeError;
use crate::executor::ScriptRunner;
use crate::keys::parse_keys;
use crate::script::{NEW_TAB_SCRIPT, NOT_FOUND_REPLY, in_session, keystroke_line, split_script};
use crate::sessions::split_fields;

/// Outcome of an action aimed at an existing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Focused,
    Renamed,
    Sent,
    /// The session id was not live when the script ran.
    NotFound,
}

impl ActionStatus {
    fn reply(self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Renamed => "renamed",
            Self::Sent => "sent",
            Self::NotFound => NOT_FOUND_REPLY,
        }
    }

    /// Map a script reply to `success` or [`ActionStatus::NotFound`].
    fn from_reply(reply: &str, success: Self) -> Self {
        if reply.trim() == success.reply() {
            success
        } else {
            Self::NotFound
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reply())
    }
}

/// Identity of a freshly created session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSession {
    pub session_id: String,
    pub tty: String,
    pub name: String,
}

impl CreatedSession {
    fn parse(reply: &str) -> Result<Self, BridgeError> {
        let mut fields = split_fields(reply, 3).into_iter();
        let session_id = fields.next().unwrap_or_default();
        if session_id.is_empty() {
            return Err(BridgeError::CommandFailed(format!(
                "unexpected reply from session creation: {reply:?}"
            )));
        }
        Ok(Self {
            session_id,
            tty: fields.next().unwrap_or_default(),
            name: fields.next().unwrap_or_default(),
        })
    }
}

/// Optional setup for a new tab or pane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSessionOptions {
    pub name: Option<String>,
    /// Typed into the new session, followed by a newline.
    pub command: Option<String>,
}

impl NewSessionOptions {
    fn argv<'a>(&'a self, target: &'a str) -> [&'a str; 3] {
        [
            target,
            self.name.as_deref().unwrap_or(""),
            self.command.as_deref().unwrap_or(""),
        ]
    }
}

/// Split orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitDirection {
    /// Side by side.
    #[default]
    Vertical,
    /// Stacked.
    Horizontal,
}

impl SplitDirection {
    fn verb(self) -> &'static str {
        match self {
            Self::Vertical => "split vertically",
            Self::Horizontal => "split horizontally",
        }
    }
}

impl FromStr for SplitDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vertical" => Ok(Self::Vertical),
            "horizontal" => Ok(Self::Horizontal),
            other => Err(format!(
                "invalid split direction '{other}' (expected 'vertical' or 'horizontal')"
            )),
        }
    }
}

/// Bring a session's window and tab to the front.
pub fn focus_session<R: ScriptRunner + ?Sized>(
    runner: &R,
    session_id: &str,
) -> Result<ActionStatus, BridgeError> {
    let script = in_session(
        r#"                        tell w to select
                        tell t to select
                        tell s to select
                        return "focused""#,
        NOT_FOUND_REPLY,
    );
    let reply = runner.run(&script, &[session_id])?;
    Ok(ActionStatus::from_reply(&reply, ActionStatus::Focused))
}

/// Set a session's display name.
pub fn rename_session<R: ScriptRunner + ?Sized>(
    runner: &R,
    session_id: &str,
    name: &str,
) -> Result<ActionStatus, BridgeError> {
    let script = in_session(
        r#"                        set name of s to (item 2 of argv)
                        return "renamed""#,
        NOT_FOUND_REPLY,
    );
    let reply = runner.run(&script, &[session_id, name])?;
    Ok(ActionStatus::from_reply(&reply, ActionStatus::Renamed))
}

/// Type `text` followed by a newline.
pub fn send_text<R: ScriptRunner + ?Sized>(
    runner: &R,
    session_id: &str,
    text: &str,
) -> Result<ActionStatus, BridgeError> {
    let script = in_session(
        r#"                        tell s to write text (item 2 of argv)
                        return "sent""#,
        NOT_FOUND_REPLY,
    );
    let reply = runner.run(&script, &[session_id, text])?;
    Ok(ActionStatus::from_reply(&reply, ActionStatus::Sent))
}

/// Deliver a key sequence such as `"up up enter"` or `"ctrl+c"`.
pub fn send_keys<R: ScriptRunner + ?Sized>(
    runner: &R,
    session_id: &str,
    keys: &str,
) -> Result<ActionStatus, BridgeError> {
    let strokes = parse_keys(keys);
    let mut argv = vec![session_id.to_string()];
    let mut body = String::from("                        tell s\n");
    for key in &strokes {
        body.push_str("                            ");
        body.push_str(&keystroke_line(key, &mut argv));
        body.push('\n');
    }
    body.push_str("                        end tell\n                        return \"sent\"");

    let script = in_session(&body, NOT_FOUND_REPLY);
    let args: Vec<&str> = argv.iter().map(String::as_str).collect();
    let reply = runner.run(&script, &args)?;
    Ok(ActionStatus::from_reply(&reply, ActionStatus::Sent))
}

/// Open a tab in `window_id` (or the first window).
pub fn create_tab<R: ScriptRunner + ?Sized>(
    runner: &R,
    window_id: Option<&str>,
    options: &NewSessionOptions,
) -> Result<CreatedSession, BridgeError> {
    let reply = runner.run(NEW_TAB_SCRIPT, &options.argv(window_id.unwrap_or("")))?;
    CreatedSession::parse(&reply)
}

/// Split `session_id` (or the first window's current session).
///
/// `Ok(None)` means the target session was not live.
pub fn split_session<R: ScriptRunner + ?Sized>(
    runner: &R,
    session_id: Option<&str>,
    direction: SplitDirection,
    options: &NewSessionOptions,
) -> Result<Option<CreatedSession>, BridgeError> {
    let script = split_script(direction.verb(), session_id.is_some());
    let reply = runner.run(&script, &options.argv(session_id.unwrap_or("")))?;
    if reply.trim() == NOT_FOUND_REPLY {
        return Ok(None);
    }
    CreatedSession::parse(&reply).map(Some)
}
