//! Key-name parsing for `send_keys`.

/// One keystroke to deliver to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStroke {
    /// Return: an empty line.
    Enter,
    /// A single control character by ASCII code.
    Control(u8),
    /// ESC followed by a fixed suffix (cursor keys).
    Escape(&'static str),
    /// Literal text, typed without a trailing newline.
    Text(String),
}

fn named_key(name: &str) -> Option<KeyStroke> {
    let key = match name {
        "enter" | "return" => KeyStroke::Enter,
        "tab" => KeyStroke::Control(9),
        "escape" | "esc" => KeyStroke::Control(27),
        "backspace" | "delete" => KeyStroke::Control(127),
        "space" => KeyStroke::Text(" ".to_string()),
        "up" => KeyStroke::Escape("[A"),
        "down" => KeyStroke::Escape("[B"),
        "right" => KeyStroke::Escape("[C"),
        "left" => KeyStroke::Escape("[D"),
        _ => return None,
    };
    Some(key)
}

/// `ctrl+<letter>` → ASCII `letter - 'a' + 1`.
fn ctrl_combo(name: &str) -> Option<KeyStroke> {
    let rest = name.strip_prefix("ctrl+")?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => Some(KeyStroke::Control(c as u8 - b'a' + 1)),
        _ => None,
    }
}

/// Parse a whitespace-separated key list such as `"up up enter"` or
/// `"ctrl+c"`. Key names are case-insensitive; anything unrecognised is
/// typed literally with its original case.
pub fn parse_keys(keys: &str) -> Vec<KeyStroke> {
    keys.split_whitespace()
        .map(|token| {
            let lower = token.to_ascii_lowercase();
            named_key(&lower)
                .or_else(|| ctrl_combo(&lower))
                .unwrap_or_else(|| KeyStroke::Text(token.to_string()))
        })
        .collect()
}
