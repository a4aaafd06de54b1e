//! AppleScript composition.
//!
//! Caller-supplied values (session ids, names, commands, typed text) always
//! travel as `argv` items. Script source is assembled only from the fixed
//! fragments in this module, so nothing a caller sends can change what a
//! script does.

use crate::keys::KeyStroke;

/// Reply for "the target session id was not live when the script ran".
pub(crate) const NOT_FOUND_REPLY: &str = "not_found";

/// Wrap `body` in a search for the session whose id is `item 1 of argv`.
///
/// Inside `body`, `w`, `t` and `s` are the matching window, tab and session.
/// When no session matches the script returns `missing`.
pub(crate) fn in_session(body: &str, missing: &str) -> String {
    format!(
        r#"on run argv
    set targetId to item 1 of argv
    tell application "iTerm2"
        repeat with w in windows
            repeat with t in tabs of w
                repeat with s in sessions of t
                    if id of s is targetId then
{body}
                    end if
                end repeat
            end repeat
        end repeat
        return "{missing}"
    end tell
end run"#
    )
}

/// argv: `[window id or "", name or "", command or ""]`.
pub(crate) const NEW_TAB_SCRIPT: &str = r#"on run argv
    set targetWindow to item 1 of argv
    set newName to item 2 of argv
    set newCommand to item 3 of argv
    tell application "iTerm2"
        if targetWindow is "" then
            set w to first window
        else
            set w to window id (targetWindow as integer)
        end if
        tell w
            set newTab to (create tab with default profile)
        end tell
        tell current session of newTab
            if newName is not "" then set name to newName
            if newCommand is not "" then write text newCommand
            set sid to id of it
            set stty to tty of it
            set sname to name of it
        end tell
        return sid & "||" & stty & "||" & sname
    end tell
end run"#;

/// Configure `newSession` from argv items 2 and 3 and report its identity.
const CONFIGURE_NEW_SESSION: &str = r#"
                        set newName to item 2 of argv
                        set newCommand to item 3 of argv
                        tell newSession
                            if newName is not "" then set name to newName
                            if newCommand is not "" then write text newCommand
                            set rsid to id of it
                            set rtty to tty of it
                            set rname to name of it
                        end tell
                        return rsid & "||" & rtty & "||" & rname"#;

/// Split script. argv: `[session id or "", name or "", command or ""]`.
///
/// `verb` is one of the fixed split verbs; with `targeted` the session named
/// by argv item 1 is split, otherwise the current session of the first window.
pub(crate) fn split_script(verb: &str, targeted: bool) -> String {
    if targeted {
        let body = format!(
            r#"                        tell s
                            set newSession to ({verb} with default profile)
                        end tell{CONFIGURE_NEW_SESSION}"#
        );
        in_session(&body, NOT_FOUND_REPLY)
    } else {
        format!(
            r#"on run argv
    tell application "iTerm2"
        tell first window
            tell current session of current tab
                set newSession to ({verb} with default profile)
            end tell
        end tell{CONFIGURE_NEW_SESSION}
    end tell
end run"#
        )
    }
}

/// One `write text` line for a keystroke. Literal text is appended to
/// `argv` and referenced by position.
pub(crate) fn keystroke_line(key: &KeyStroke, argv: &mut Vec<String>) -> String {
    match key {
        KeyStroke::Enter => r#"write text """#.to_string(),
        KeyStroke::Control(code) => format!("write text (ASCII character {code}) without newline"),
        KeyStroke::Escape(suffix) => {
            format!(r#"write text ((ASCII character 27) & "{suffix}") without newline"#)
        }
        KeyStroke::Text(text) => {
            argv.push(text.clone());
            format!("write text (item {} of argv) without newline", argv.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_session_embeds_body_and_missing_reply() {
        let script = in_session("tell s to return contents", "");
        assert!(script.starts_with("on run argv"));
        assert!(script.contains("set targetId to item 1 of argv"));
        assert!(script.contains("tell s to return contents"));
        assert!(script.contains(r#"return """#));
    }

    #[test]
    fn targeted_split_uses_session_search() {
        let script = split_script("split vertically", true);
        assert!(script.contains("if id of s is targetId then"));
        assert!(script.contains("(split vertically with default profile)"));
        assert!(script.contains(r#"return "not_found""#));
        assert!(script.contains("set newName to item 2 of argv"));
    }

    #[test]
    fn default_split_uses_first_window() {
        let script = split_script("split horizontally", false);
        assert!(script.contains("tell current session of current tab"));
        assert!(script.contains("(split horizontally with default profile)"));
        assert!(!script.contains("targetId"));
    }

    #[test]
    fn keystroke_lines() {
        let mut argv = vec!["w0t0p0".to_string()];
        assert_eq!(keystroke_line(&KeyStroke::Enter, &mut argv), r#"write text """#);
        assert_eq!(
            keystroke_line(&KeyStroke::Control(3), &mut argv),
            "write text (ASCII character 3) without newline"
        );
        assert_eq!(
            keystroke_line(&KeyStroke::Escape("[A"), &mut argv),
            r#"write text ((ASCII character 27) & "[A") without newline"#
        );
        assert_eq!(argv.len(), 1);
    }

    #[test]
    fn literal_text_goes_through_argv() {
        let mut argv = vec!["w0t0p0".to_string()];
        let line = keystroke_line(&KeyStroke::Text("\" & do shell script \"rm".into()), &mut argv);
        assert_eq!(line, "write text (item 2 of argv) without newline");
        assert_eq!(argv[1], "\" & do shell script \"rm");
    }
}
