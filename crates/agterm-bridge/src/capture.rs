//! Session contents capture.

use crate::error::BridgeError;
use crate::executor::ScriptRunner;
use crate::script::in_session;

/// Read the visible contents of a session by id.
///
/// Returns raw text, escape sequences included. A session id that is no
/// longer live yields an empty string.
pub fn read_contents<R: ScriptRunner + ?Sized>(
    runner: &R,
    session_id: &str,
) -> Result<String, BridgeError> {
    let script = in_session("                        tell s to return contents", "");
    runner.run(&script, &[session_id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_read_contents() {
        struct MockRunner;
        impl ScriptRunner for MockRunner {
            fn run(&self, script: &str, args: &[&str]) -> Result<String, BridgeError> {
                assert!(script.contains("return contents"));
                assert_eq!(args, ["w0t0p0"]);
                Ok("line 1\nline 2\n".to_string())
            }
        }
        let text = read_contents(&MockRunner, "w0t0p0").expect("should read");
        assert_eq!(text, "line 1\nline 2\n");
    }

    #[test]
    fn session_id_is_never_spliced_into_script() {
        struct MockRunner;
        impl ScriptRunner for MockRunner {
            fn run(&self, script: &str, _args: &[&str]) -> Result<String, BridgeError> {
                assert!(!script.contains("evil\""));
                Ok(String::new())
            }
        }
        let text = read_contents(&MockRunner, "evil\" & quit").expect("should read");
        assert!(text.is_empty());
    }
}
