//! MCP tool catalogue and dispatch onto [`Terminals`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use agterm_bridge::NewSessionOptions;

use crate::service::{ServiceError, Terminals};

/// Default line window for `iterm_read_output`.
pub const DEFAULT_READ_LINES: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResult {
    pub fn json<T: Serialize>(value: &T) -> Self {
        let text = serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string());
        Self {
            content: vec![ToolContent::Text { text }],
            is_error: None,
        }
    }

    /// A failed call: `{"error": message}` with `isError` set.
    pub fn error(message: impl Into<String>) -> Self {
        let text = json!({ "error": message.into() }).to_string();
        Self {
            content: vec![ToolContent::Text { text }],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content block.
    pub fn text(&self) -> &str {
        match self.content.first() {
            Some(ToolContent::Text { text }) => text,
            None => "",
        }
    }
}

const IDENTIFIER_HELP: &str = "A session ID, TTY path, or (partial) session name.";

fn identifier_schema(extra: Value) -> Value {
    let mut properties = json!({
        "identifier": { "type": "string", "description": IDENTIFIER_HELP }
    });
    if let (Some(props), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        props.extend(extra);
    }
    properties
}

pub fn all_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "iterm_list_sessions",
            "List all iTerm2 sessions across every window, tab, and pane, with window info, \
             tab index, and whether each is registered.",
            json!({ "type": "object", "properties": {} }),
        ),
        ToolDefinition::new(
            "iterm_register_session",
            "Register a TTY as belonging to the calling agent session. Call once at startup \
             so other tools know which terminal is yours.",
            json!({
                "type": "object",
                "properties": {
                    "tty_path": { "type": "string", "description": "TTY device path, e.g. /dev/ttys004." }
                },
                "required": ["tty_path"]
            }),
        ),
        ToolDefinition::new(
            "iterm_focus_session",
            "Bring an iTerm2 session to the foreground.",
            json!({
                "type": "object",
                "properties": identifier_schema(json!({})),
                "required": ["identifier"]
            }),
        ),
        ToolDefinition::new(
            "iterm_get_session_by_name",
            "Find iTerm2 sessions whose name matches the query (fuzzy), best first, at most five.",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Full or partial session name." }
                },
                "required": ["name"]
            }),
        ),
        ToolDefinition::new(
            "iterm_set_session_name",
            "Rename an iTerm2 session.",
            json!({
                "type": "object",
                "properties": identifier_schema(json!({
                    "new_name": { "type": "string", "description": "The new display name." }
                })),
                "required": ["identifier", "new_name"]
            }),
        ),
        ToolDefinition::new(
            "iterm_new_tab",
            "Create a new tab, optionally named and running a command. The tab is coloured purple.",
            json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "Shell command to run in the new tab." },
                    "name": { "type": "string", "description": "Display name for the new session." },
                    "window_identifier": {
                        "type": "string",
                        "description": "Session ID, TTY, or name of a session in the target window. Defaults to the frontmost window."
                    }
                }
            }),
        ),
        ToolDefinition::new(
            "iterm_split_pane",
            "Split the given (or current) pane to create a new session. The pane is coloured blue.",
            json!({
                "type": "object",
                "properties": {
                    "direction": {
                        "type": "string",
                        "enum": ["vertical", "horizontal"],
                        "description": "vertical (side by side) or horizontal (stacked). Default vertical."
                    },
                    "command": { "type": "string", "description": "Shell command to run in the new pane." },
                    "name": { "type": "string", "description": "Display name for the new session." },
                    "identifier": {
                        "type": "string",
                        "description": "Session ID, TTY, or name of the pane to split. Defaults to the current session of the frontmost window."
                    }
                }
            }),
        ),
        ToolDefinition::new(
            "iterm_send_command",
            "Send a shell command followed by Enter to an iTerm2 session.",
            json!({
                "type": "object",
                "properties": identifier_schema(json!({
                    "command": { "type": "string", "description": "The command line to run." }
                })),
                "required": ["identifier", "command"]
            }),
        ),
        ToolDefinition::new(
            "iterm_send_keys",
            "Send special keys or key combos to an iTerm2 session, e.g. \"ctrl+c\", \"up up enter\", \
             \"tab\", \"escape\". Unrecognised words are typed literally.",
            json!({
                "type": "object",
                "properties": identifier_schema(json!({
                    "keys": { "type": "string", "description": "Space-separated key names." }
                })),
                "required": ["identifier", "keys"]
            }),
        ),
        ToolDefinition::new(
            "iterm_read_output",
            "Read the last N lines of visible output from an iTerm2 session.",
            json!({
                "type": "object",
                "properties": identifier_schema(json!({
                    "lines": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Maximum number of lines to return (default 50)."
                    }
                })),
                "required": ["identifier"]
            }),
        ),
        ToolDefinition::new(
            "iterm_watch_session",
            "Get only the output that appeared since the previous watch of a session. The first \
             call returns the whole visible buffer.",
            json!({
                "type": "object",
                "properties": identifier_schema(json!({})),
                "required": ["identifier"]
            }),
        ),
    ]
}

pub fn get_tool(name: &str) -> Option<ToolDefinition> {
    all_tools().into_iter().find(|t| t.name == name)
}

// ─── Arguments ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct IdentifierArgs {
    identifier: String,
}

#[derive(Deserialize)]
struct RegisterArgs {
    tty_path: String,
}

#[derive(Deserialize)]
struct FindArgs {
    name: String,
}

#[derive(Deserialize)]
struct RenameArgs {
    identifier: String,
    new_name: String,
}

#[derive(Deserialize)]
struct CommandArgs {
    identifier: String,
    command: String,
}

#[derive(Deserialize)]
struct KeysArgs {
    identifier: String,
    keys: String,
}

#[derive(Deserialize)]
struct ReadArgs {
    identifier: String,
    #[serde(default = "default_read_lines")]
    lines: usize,
}

fn default_read_lines() -> usize {
    DEFAULT_READ_LINES
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct NewTabArgs {
    command: Option<String>,
    name: Option<String>,
    window_identifier: Option<String>,
}

#[derive(Deserialize)]
struct SplitArgs {
    #[serde(default = "default_direction")]
    direction: String,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    identifier: Option<String>,
}

fn default_direction() -> String {
    "vertical".to_string()
}

/// Empty strings mean "not given".
fn given(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse<T: DeserializeOwned>(arguments: Value) -> Result<T, ServiceError> {
    serde_json::from_value(arguments).map_err(|e| ServiceError::InvalidArgument(e.to_string()))
}

// ─── Dispatch ────────────────────────────────────────────────────

/// Run one tool. Failures come back as an error result, never a panic or
/// an RPC error.
pub async fn call_tool(terminals: &Terminals, name: &str, arguments: Value) -> ToolResult {
    match dispatch(terminals, name, arguments).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(tool = name, "tool call failed: {e}");
            ToolResult::error(e.to_string())
        }
    }
}

async fn dispatch(t: &Terminals, name: &str, arguments: Value) -> Result<ToolResult, ServiceError> {
    let result = match name {
        "iterm_list_sessions" => ToolResult::json(&t.list_sessions().await?),
        "iterm_register_session" => {
            let args: RegisterArgs = parse(arguments)?;
            ToolResult::json(&t.register(&args.tty_path).await?)
        }
        "iterm_focus_session" => {
            let args: IdentifierArgs = parse(arguments)?;
            ToolResult::json(&t.focus(&args.identifier).await?)
        }
        "iterm_get_session_by_name" => {
            let args: FindArgs = parse(arguments)?;
            ToolResult::json(&t.find_by_name(&args.name).await?)
        }
        "iterm_set_session_name" => {
            let args: RenameArgs = parse(arguments)?;
            ToolResult::json(&t.rename(&args.identifier, &args.new_name).await?)
        }
        "iterm_new_tab" => {
            let args: NewTabArgs = parse(arguments)?;
            let options = NewSessionOptions {
                name: given(args.name),
                command: given(args.command),
            };
            let window = given(args.window_identifier);
            ToolResult::json(&t.new_tab(options, window.as_deref()).await?)
        }
        "iterm_split_pane" => {
            let args: SplitArgs = parse(arguments)?;
            let options = NewSessionOptions {
                name: given(args.name),
                command: given(args.command),
            };
            let target = given(args.identifier);
            ToolResult::json(&t.split_pane(&args.direction, options, target.as_deref()).await?)
        }
        "iterm_send_command" => {
            let args: CommandArgs = parse(arguments)?;
            ToolResult::json(&t.send_command(&args.identifier, &args.command).await?)
        }
        "iterm_send_keys" => {
            let args: KeysArgs = parse(arguments)?;
            ToolResult::json(&t.send_keys(&args.identifier, &args.keys).await?)
        }
        "iterm_read_output" => {
            let args: ReadArgs = parse(arguments)?;
            ToolResult::json(&t.read_output(&args.identifier, args.lines).await?)
        }
        "iterm_watch_session" => {
            let args: IdentifierArgs = parse(arguments)?;
            ToolResult::json(&t.watch(&args.identifier).await?)
        }
        other => return Err(ServiceError::InvalidArgument(format!("unknown tool '{other}'"))),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::{FakeTerminal, LISTING, terminals};
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn body(result: &ToolResult) -> Value {
        serde_json::from_str(result.text()).expect("tool body is json")
    }

    #[test]
    fn catalogue_is_complete_and_unique() {
        let tools = all_tools();
        assert_eq!(tools.len(), 11);
        let names: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len());
        for tool in &tools {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(tool.name.starts_with("iterm_"));
        }
        assert!(get_tool("iterm_watch_session").is_some());
        assert!(get_tool("iterm_nope").is_none());
    }

    #[test]
    fn identifier_schema_merges_extra_properties() {
        let schema = identifier_schema(json!({ "keys": { "type": "string" } }));
        assert!(schema.get("identifier").is_some());
        assert!(schema.get("keys").is_some());
    }

    #[test]
    fn definition_uses_camel_case() {
        let value = serde_json::to_value(&all_tools()[0]).expect("json");
        assert!(value.get("inputSchema").is_some());
    }

    #[test]
    fn error_result_shape() {
        let value = serde_json::to_value(ToolResult::error("boom")).expect("json");
        assert_eq!(value["isError"], true);
        assert_eq!(value["content"][0]["type"], "text");
        let text = value["content"][0]["text"].as_str().expect("text");
        assert_eq!(serde_json::from_str::<Value>(text).expect("json")["error"], "boom");
    }

    #[tokio::test]
    async fn list_sessions_tool() {
        let dir = TempDir::new().expect("tempdir");
        let t = terminals(FakeTerminal::new(LISTING), &dir);
        let result = call_tool(&t, "iterm_list_sessions", json!({})).await;
        assert!(!result.is_error());
        let listed = body(&result);
        assert_eq!(listed.as_array().expect("array").len(), 3);
        assert_eq!(listed[0]["session_id"], "w0t0p0");
        assert_eq!(listed[0]["registered"], false);
        assert_eq!(listed[0]["tab_index"], 1);
    }

    #[tokio::test]
    async fn register_tool_shape() {
        let dir = TempDir::new().expect("tempdir");
        let t = terminals(FakeTerminal::new(LISTING), &dir);
        let result = call_tool(
            &t,
            "iterm_register_session",
            json!({ "tty_path": "/dev/ttys003" }),
        )
        .await;
        let registered = body(&result);
        assert_eq!(registered["status"], "registered");
        assert_eq!(registered["tty"], "/dev/ttys003");
        assert_eq!(registered["remote_session_id"], "w1t0p0");
        assert!(registered["registered_at"].is_string());
    }

    #[tokio::test]
    async fn read_output_defaults_to_fifty_lines() {
        let dir = TempDir::new().expect("tempdir");
        let buffer: String = (1..=80).map(|i| format!("{i}\n")).collect();
        let t = terminals(FakeTerminal::new(LISTING).with_contents(&[&buffer]), &dir);
        let result = call_tool(&t, "iterm_read_output", json!({ "identifier": "zsh" })).await;
        let read = body(&result);
        assert_eq!(read["line_count"], 50);
        assert!(read["output"].as_str().expect("output").starts_with("31\n"));
    }

    #[tokio::test]
    async fn find_by_name_tool_returns_scores() {
        let dir = TempDir::new().expect("tempdir");
        let t = terminals(FakeTerminal::new(LISTING), &dir);
        let result = call_tool(&t, "iterm_get_session_by_name", json!({ "name": "build" })).await;
        let found = body(&result);
        assert_eq!(found[0]["name"], "build server");
        assert!(found[0]["score"].as_f64().expect("score") >= 0.5);
    }

    #[tokio::test]
    async fn not_found_is_error_result() {
        let dir = TempDir::new().expect("tempdir");
        let t = terminals(FakeTerminal::new(LISTING), &dir);
        let result = call_tool(
            &t,
            "iterm_focus_session",
            json!({ "identifier": "qqqqqqqqqqqq" }),
        )
        .await;
        assert!(result.is_error());
        let message = body(&result)["error"].as_str().expect("message").to_string();
        assert!(message.contains("qqqqqqqqqqqq"), "got: {message}");
        assert!(message.contains("build server"), "got: {message}");
    }

    #[tokio::test]
    async fn missing_argument_is_error_result() {
        let dir = TempDir::new().expect("tempdir");
        let t = terminals(FakeTerminal::new(LISTING), &dir);
        let result = call_tool(&t, "iterm_send_keys", json!({ "identifier": "zsh" })).await;
        assert!(result.is_error());
        assert!(body(&result)["error"].as_str().expect("message").contains("keys"));
    }

    #[tokio::test]
    async fn split_with_empty_strings_uses_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let t = terminals(
            FakeTerminal::new(LISTING).with_reply("w0t0p1||||zsh"),
            &dir,
        );
        let result = call_tool(
            &t,
            "iterm_split_pane",
            json!({ "identifier": "", "name": "", "command": "" }),
        )
        .await;
        assert!(!result.is_error(), "{}", result.text());
        let created = body(&result);
        assert_eq!(created["status"], "created");
        assert_eq!(created["session_id"], "w0t0p1");
    }
}
