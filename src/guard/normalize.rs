use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Zero-width and directional-control characters commonly used to smuggle
/// instructions inside visually innocuous document text.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}'   // zero-width space/joiner/non-joiner, LRM/RLM
        | '\u{202A}'..='\u{202E}' // directional embeddings and overrides
        | '\u{2060}'..='\u{206F}' // word joiner, invisible operators
        | '\u{FEFF}'              // BOM / zero-width no-break space
    )
}

static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n\s*\n+").unwrap());

/// Normalize extracted document text before any injection scanning or
/// prompting: NFKC composition, invisible-character removal, whitespace
/// collapse, and trim. Idempotent.
pub fn normalize_text(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();
    let visible: String = composed.chars().filter(|c| !is_invisible(*c)).collect();
    let collapsed = HORIZONTAL_WS.replace_all(&visible, " ");
    let collapsed = BLANK_LINES.replace_all(&collapsed, "\n\n");
    collapsed.trim().to_string()
}
