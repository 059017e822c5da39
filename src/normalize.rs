//! Markdown cleanup for exported chat text.
//!
//! Copilot prompts and responses arrive as markdown; the export format is
//! plain text. The rules here strip the common markup without attempting a
//! full parse: unbalanced markers are tolerated and the pass never fails.

use regex::Regex;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\w*\n?").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Strip markdown artifacts from chat text.
///
/// Rules run in a fixed order; later rules assume earlier ones already ran.
/// Fenced code blocks and inline code keep their contents, emphasis markers
/// are unwrapped, runs of blank lines collapse to one, and horizontal
/// whitespace collapses to single spaces. Idempotent on its own output.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = FENCE.replace_all(raw, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = text.trim();
    HORIZONTAL_WS.replace_all(text, " ").into_owned()
}
