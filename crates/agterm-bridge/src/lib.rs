//! agterm-bridge: iTerm2 automation IO boundary.
//! Runs AppleScript through `osascript`, parses session listings, reads
//! session contents and performs session actions. Callers pass concrete
//! session ids; resolution lives in `agterm-core`.

pub mod actions;
pub mod capture;
pub mod colors;
pub mod error;
pub mod executor;
pub mod keys;
mod script;
pub mod sessions;

pub use actions::{
    ActionStatus, CreatedSession, NewSessionOptions, SplitDirection, create_tab, focus_session,
    rename_session, send_keys, send_text, split_session,
};
pub use capture::read_contents;
pub use colors::{ColorScheme, TabColor, apply_tab_color};
pub use error::BridgeError;
pub use executor::{OsascriptExecutor, ScriptRunner};
pub use keys::{KeyStroke, parse_keys};
pub use sessions::{FIELD_SEPARATOR, LIST_SESSIONS_SCRIPT, list_sessions, parse_session_listing};
