//! Session enumeration script and listing parser.

use agterm_core::Session;

use crate::error::BridgeError;
use crate::executor::ScriptRunner;

/// Field separator in every composite line the scripts emit.
pub const FIELD_SEPARATOR: &str = "||";

/// Fields per listing line: id, name, tty, window id, window name, tab index.
const LISTING_FIELDS: usize = 6;

/// Walks windows → tabs → sessions, one `||`-joined line per session.
pub const LIST_SESSIONS_SCRIPT: &str = r#"
tell application "iTerm2"
    set output to ""
    repeat with w in windows
        set wid to id of w
        set wname to name of w
        set tcount to 0
        repeat with t in tabs of w
            set tcount to tcount + 1
            repeat with s in sessions of t
                set output to output & (id of s) & "||" & (name of s) & "||" & (tty of s) & "||" & wid & "||" & wname & "||" & tcount & linefeed
            end repeat
        end repeat
    end repeat
    return output
end tell
"#;

/// Run the enumeration script and parse the result.
pub fn list_sessions<R: ScriptRunner + ?Sized>(runner: &R) -> Result<Vec<Session>, BridgeError> {
    let output = runner.run(LIST_SESSIONS_SCRIPT, &[])?;
    Ok(parse_session_listing(&output))
}

/// Parse the enumeration output. Malformed lines are skipped, never fatal.
pub fn parse_session_listing(output: &str) -> Vec<Session> {
    output
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return None;
            }
            let parsed = parse_line(trimmed);
            if parsed.is_none() {
                tracing::debug!(line_num = idx + 1, line = trimmed, "skipping malformed session line");
            }
            parsed
        })
        .collect()
}

fn parse_line(line: &str) -> Option<Session> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() < LISTING_FIELDS {
        return None;
    }
    let tab_index = parts[5].trim().parse::<u32>().ok()?;
    Some(Session {
        session_id: parts[0].to_string(),
        name: parts[1].to_string(),
        tty: parts[2].to_string(),
        window_id: parts[3].to_string(),
        window_name: parts[4].to_string(),
        tab_index,
    })
}

/// Split a short `||`-joined result into exactly `n` fields, padding missing
/// trailing fields with empty strings.
pub(crate) fn split_fields(line: &str, n: usize) -> Vec<String> {
    let mut fields: Vec<String> = line
        .trim()
        .splitn(n, FIELD_SEPARATOR)
        .map(str::to_string)
        .collect();
    fields.resize(n, String::new());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_line() {
        let out = "w0t0p0:ABC||zsh||/dev/ttys004||1234||main||1";
        let sessions = parse_session_listing(out);
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.session_id, "w0t0p0:ABC");
        assert_eq!(s.name, "zsh");
        assert_eq!(s.tty, "/dev/ttys004");
        assert_eq!(s.window_id, "1234");
        assert_eq!(s.window_name, "main");
        assert_eq!(s.tab_index, 1);
    }

    #[test]
    fn parse_multiple_sessions_in_order() {
        let out = [
            "w0t0p0||zsh||/dev/ttys000||1||main||1",
            "w0t0p1||build||/dev/ttys001||1||main||1",
            "w1t0p0||Claude Code (node)||/dev/ttys002||2||other||1",
        ]
        .join("\n");
        let sessions = parse_session_listing(&out);
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[1].name, "build");
        assert_eq!(sessions[2].name, "Claude Code (node)");
    }

    #[test]
    fn short_line_is_skipped() {
        let out = "w0t0p0||zsh||/dev/ttys000\nw0t0p1||build||/dev/ttys001||1||main||2\n";
        let sessions = parse_session_listing(out);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "w0t0p1");
        assert_eq!(sessions[0].tab_index, 2);
    }

    #[test]
    fn bad_tab_index_is_skipped() {
        let out = "w0t0p0||zsh||/dev/ttys000||1||main||x";
        assert!(parse_session_listing(out).is_empty());
    }

    #[test]
    fn empty_and_blank_output() {
        assert!(parse_session_listing("").is_empty());
        assert!(parse_session_listing("\n  \n").is_empty());
    }

    #[test]
    fn name_with_spaces_and_pipes() {
        // A single '|' in a name does not split; extra fields are ignored.
        let out = "w0t0p0||a | b||/dev/ttys000||1||main||3||extra";
        let sessions = parse_session_listing(out);
        assert_eq!(sessions[0].name, "a | b");
        assert_eq!(sessions[0].tab_index, 3);
    }

    #[test]
    fn split_fields_pads() {
        assert_eq!(split_fields("a||b", 3), vec!["a", "b", ""]);
        assert_eq!(split_fields("a||b||c\n", 3), vec!["a", "b", "c"]);
        assert_eq!(split_fields("", 3), vec!["", "", ""]);
    }

    #[test]
    fn mock_runner_list_sessions() {
        struct MockRunner;
        impl ScriptRunner for MockRunner {
            fn run(&self, script: &str, args: &[&str]) -> Result<String, BridgeError> {
                assert!(script.contains("repeat with s in sessions of t"));
                assert!(args.is_empty());
                Ok("w0t0p0||zsh||/dev/ttys004||1||main||1\n".to_string())
            }
        }
        let sessions = list_sessions(&MockRunner).expect("should list");
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].tty, "/dev/ttys004");
    }

    #[test]
    fn runner_error_propagates() {
        struct Failing;
        impl ScriptRunner for Failing {
            fn run(&self, _script: &str, _args: &[&str]) -> Result<String, BridgeError> {
                Err(BridgeError::CommandFailed("iTerm2 is not running".into()))
            }
        }
        assert!(list_sessions(&Failing).is_err());
    }
}
