//! Error types for the automation bridge.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("AppleScript error: {0}")]
    CommandFailed(String),

    #[error("osascript did not finish within {secs}s")]
    Timeout { secs: u64 },

    #[error("osascript io error: {0}")]
    Io(#[from] std::io::Error),
}
