//! Output views over scrubbed buffer text: the stateless "last N lines"
//! window and the per-session watch cursor that yields incremental deltas.

use crate::scrub::scrub;

// ─── Windowing ───────────────────────────────────────────────────

/// Split into lines, dropping trailing blank (whitespace-only) lines.
pub fn trim_trailing_blank(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// The last `max_lines` lines of `text`, after trailing blank lines are
/// removed. Fewer lines than requested → all of them.
pub fn last_lines(text: &str, max_lines: usize) -> Vec<&str> {
    let lines = trim_trailing_blank(text);
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].to_vec()
}

/// Scrub a raw snapshot and canonicalise it for cursor comparison:
/// trailing blank lines dropped, lines joined with `\n`.
pub fn normalize_snapshot(raw: &str) -> String {
    trim_trailing_blank(&scrub(raw)).join("\n")
}

// ─── Watch cursor ────────────────────────────────────────────────

/// Result of one watch observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchDelta {
    pub text: String,
    /// True only for the observation that created the cursor.
    pub is_first_read: bool,
}

impl WatchDelta {
    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Last observed text for one session.
///
/// Two states: unseen (`None`) and tracked. Every observation moves the
/// cursor to the new text, whatever the delta turned out to be.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchCursor {
    last: Option<String>,
}

impl WatchCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self) -> bool {
        self.last.is_some()
    }

    /// Feed the current normalised text and get what is new since the
    /// previous observation.
    ///
    /// Append-only growth yields just the appended part, minus one leading
    /// newline. Anything else (scroll, clear, redraw) yields the full text.
    pub fn observe(&mut self, current: &str) -> WatchDelta {
        let delta = match self.last.as_deref() {
            None => WatchDelta {
                text: current.to_string(),
                is_first_read: true,
            },
            Some(previous) => {
                let text = match current.strip_prefix(previous) {
                    Some(appended) => appended.strip_prefix('\n').unwrap_or(appended),
                    None => current,
                };
                WatchDelta {
                    text: text.to_string(),
                    is_first_read: false,
                }
            }
        };
        self.last = Some(current.to_string());
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── windowing ───────────────────────────────────────────────

    #[test]
    fn window_keeps_last_n_in_order() {
        let text: String = (1..=100).map(|i| format!("line {i}\n")).collect();
        let window = last_lines(&text, 10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0], "line 91");
        assert_eq!(window[9], "line 100");
    }

    #[test]
    fn window_short_buffer_returns_all() {
        let window = last_lines("a\nb\nc", 10);
        assert_eq!(window, vec!["a", "b", "c"]);
    }

    #[test]
    fn window_excludes_trailing_blank_lines() {
        let text = "one\ntwo\nthree\n\n   \n\t\n";
        assert_eq!(last_lines(text, 2), vec!["two", "three"]);
        assert_eq!(last_lines(text, 10), vec!["one", "two", "three"]);
    }

    #[test]
    fn window_keeps_interior_blank_lines() {
        let text = "one\n\nthree\n\n";
        assert_eq!(last_lines(text, 3), vec!["one", "", "three"]);
    }

    #[test]
    fn window_zero_is_empty() {
        assert!(last_lines("a\nb", 0).is_empty());
    }

    #[test]
    fn window_of_blank_buffer_is_empty() {
        assert!(last_lines("\n\n  \n", 5).is_empty());
        assert!(last_lines("", 5).is_empty());
    }

    #[test]
    fn normalize_scrubs_and_trims() {
        let raw = "\x1b[32m$ ls\x1b[0m\nfile.txt\n\n\n";
        assert_eq!(normalize_snapshot(raw), "$ ls\nfile.txt");
    }

    // ─── watch cursor ────────────────────────────────────────────

    #[test]
    fn first_observation_returns_everything() {
        let mut cursor = WatchCursor::new();
        assert!(!cursor.is_tracked());
        let d = cursor.observe("a\nb");
        assert_eq!(d.text, "a\nb");
        assert!(d.is_first_read);
        assert!(cursor.is_tracked());
    }

    #[test]
    fn append_returns_only_new_lines() {
        let mut cursor = WatchCursor::new();
        cursor.observe("a\nb");
        let d = cursor.observe("a\nb\nc");
        assert_eq!(d.text, "c");
        assert!(!d.is_first_read);
        assert_eq!(d.line_count(), 1);
    }

    #[test]
    fn no_new_output_is_empty_delta() {
        let mut cursor = WatchCursor::new();
        cursor.observe("a\nb");
        let d = cursor.observe("a\nb");
        assert_eq!(d.text, "");
        assert!(!d.is_first_read);
        assert_eq!(d.line_count(), 0);
    }

    #[test]
    fn non_append_returns_full_text() {
        let mut cursor = WatchCursor::new();
        cursor.observe("a\nb");
        let d = cursor.observe("x\ny");
        assert_eq!(d.text, "x\ny");
        assert!(!d.is_first_read);
    }

    #[test]
    fn cursor_moves_after_redraw() {
        let mut cursor = WatchCursor::new();
        cursor.observe("a\nb");
        cursor.observe("x\ny");
        let d = cursor.observe("x\ny\nz");
        assert_eq!(d.text, "z");
    }

    #[test]
    fn partial_line_growth_is_appended_text() {
        let mut cursor = WatchCursor::new();
        cursor.observe("$ make");
        let d = cursor.observe("$ make all");
        assert_eq!(d.text, " all");
    }

    #[test]
    fn empty_first_read_still_tracks() {
        let mut cursor = WatchCursor::new();
        let first = cursor.observe("");
        assert!(first.is_first_read);
        let second = cursor.observe("hello");
        assert!(!second.is_first_read);
        assert_eq!(second.text, "hello");
    }

    #[test]
    fn only_one_leading_newline_stripped() {
        let mut cursor = WatchCursor::new();
        cursor.observe("a");
        let d = cursor.observe("a\n\nb");
        assert_eq!(d.text, "\nb");
    }
}
