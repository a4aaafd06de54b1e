//! CLI definition using clap derive. Every global option can also come from
//! the environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::registry::DEFAULT_STATE_FILE;
use crate::tools::DEFAULT_READ_LINES;

#[derive(Parser, Debug)]
#[command(name = "agterm", version, about = "iTerm2 session bridge for AI coding agents")]
pub struct Cli {
    /// Registry file mapping ttys to registered sessions
    #[arg(long, global = true, env = "AGTERM_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// osascript binary used to talk to iTerm2
    #[arg(long, global = true, env = "AGTERM_OSASCRIPT", default_value = "osascript")]
    pub osascript_bin: String,

    /// Seconds before a hung osascript call is killed
    #[arg(long, global = true, env = "AGTERM_BRIDGE_TIMEOUT_SECS", default_value_t = 30)]
    pub bridge_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the MCP server on stdio (default)
    Serve,
    /// List live sessions as JSON, with registry status
    Ls,
    /// Print the last lines of a session's visible output
    Read(ReadOpts),
    /// Fuzzy-find sessions by name
    Find(FindOpts),
    /// Register the session on a tty
    Register(RegisterOpts),
}

#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct ReadOpts {
    /// Session id, tty path, or (partial) name
    pub identifier: String,

    /// Maximum number of lines
    #[arg(long, short = 'n', default_value_t = DEFAULT_READ_LINES)]
    pub lines: usize,
}

#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct FindOpts {
    pub name: String,
}

#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct RegisterOpts {
    /// tty device path, e.g. /dev/ttys004
    pub tty: String,
}
