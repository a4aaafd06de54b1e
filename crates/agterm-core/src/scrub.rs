//! Escape-sequence scrubber for raw terminal buffer snapshots.

use std::sync::LazyLock;

use regex::Regex;

/// OSC (`ESC ]` … BEL / ST) and CSI sequences. A CSI is `ESC [`, parameter
/// bytes `0x30..=0x3F` (digits, `;`, and the private markers `<=>?`),
/// intermediate bytes `0x20..=0x2F`, then one final byte `0x40..=0x7E`.
static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b\[[0-?]*[ -/]*[@-~]")
        .expect("escape sequence pattern")
});

/// Parameters of an iTerm2 tab-colour OSC whose framing bytes were already
/// consumed by the bridge, e.g. `6;1;bg;red;brightness;124`.
///
/// Back-to-back payloads run together (`…brightness;1246;1;bg;green;…`), so a
/// whole chain is matched at once; the digits between two payloads cannot be
/// split reliably.
static BARE_COLOR_PAYLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[0-9]+;[0-9]+;bg;[A-Za-z]+;brightness;(?:[0-9]+;[0-9]+;bg;[A-Za-z]+;brightness;)*[0-9]+",
    )
    .expect("bare payload pattern")
});

/// Remove control sequences from a buffer snapshot.
///
/// Framed sequences go first: the bare payload form only exists once the
/// framing is gone, and stripping it first could leave half a sequence behind.
pub fn scrub(raw: &str) -> String {
    let unframed = ESCAPE_SEQUENCE.replace_all(raw, "");
    BARE_COLOR_PAYLOAD.replace_all(&unframed, "").into_owned()
}
