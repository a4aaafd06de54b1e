//! Tab colour marking via iTerm2's proprietary OSC 6 sequence, written
//! straight to a session's tty.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// An RGB tab colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl TabColor {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Three `ESC ] 6;1;bg;<channel>;brightness;<n> BEL` sequences.
    pub fn osc_sequence(&self) -> String {
        [("red", self.red), ("green", self.green), ("blue", self.blue)]
            .iter()
            .map(|(channel, value)| format!("\x1b]6;1;bg;{channel};brightness;{value}\x07"))
            .collect()
    }
}

/// Colours for sessions the agent creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    /// New tabs (background work).
    BackgroundTask,
    /// New split panes.
    SplitPane,
}

impl ColorScheme {
    pub fn tab_color(self) -> TabColor {
        match self {
            Self::BackgroundTask => TabColor::new(124, 58, 237),
            Self::SplitPane => TabColor::new(59, 130, 246),
        }
    }
}

/// Write `color` to the tty device at `tty`.
pub fn apply_tab_color(tty: impl AsRef<Path>, color: TabColor) -> io::Result<()> {
    let mut device = OpenOptions::new().write(true).open(tty)?;
    device.write_all(color.osc_sequence().as_bytes())?;
    device.flush()
}
