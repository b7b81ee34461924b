//! Best-effort JSON recovery from LLM replies.
//!
//! Models asked for bare JSON still wrap it in code fences or prose often
//! enough that discarding such replies would throw away good extractions.
//! Recovery never fails: if no object can be located the trimmed reply is
//! returned as-is, and the parse error surfaces downstream where it can be
//! reported alongside the raw reply.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Extracts the most plausible JSON object from a model reply.
///
/// Strategy, in order: strip a surrounding code fence, then scan for the
/// first balanced top-level object (string-literal aware, so braces inside
/// strings do not truncate the object), then fall back to the greedy
/// first-`{`/last-`}` slice, then give up and return the trimmed input.
/// The candidate then gets a bare-sentinel repair pass before it is handed
/// back for parsing.
pub fn recover_json(reply: &str) -> String {
    let trimmed = strip_code_fence(reply.trim());

    if let Some(object) = balanced_object(trimmed) {
        return repair_bare_sentinels(object);
    }

    // Greedy fallback for replies with unbalanced braces.
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return repair_bare_sentinels(&trimmed[start..=end]);
        }
    }

    repair_bare_sentinels(trimmed)
}

// Sentinel `--` emitted without its quotes: `"version": --,`.
static BARE_SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m):\s*--\s*([,}])").unwrap());
// Sentinel whose closing quote was dropped: `"--,`.
static UNTERMINATED_SENTINEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""--\s*,"#).unwrap());

/// Re-quotes `--` sentinels the model emitted without proper quoting. The
/// extraction prompt mandates the `"--"` sentinel for missing fields, which
/// makes a dropped pair of quotes the most common malformed-reply shape; a
/// reply that is broken in this one predictable way still yields a record.
fn repair_bare_sentinels(text: &str) -> String {
    let repaired = UNTERMINATED_SENTINEL.replace_all(text, "\"--\",");
    BARE_SENTINEL.replace_all(&repaired, ": \"--\"${1}").into_owned()
}

/// Removes a surrounding ``` fence, including an optional language tag on
/// the opening line. Leaves anything else untouched.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the language tag line ("json", "JSON", or empty).
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => return text,
    };
    match body.rfind("```") {
        Some(pos) => body[..pos].trim(),
        None => body.trim(),
    }
}

/// Finds the first balanced `{...}` object, tracking string literals and
/// escape sequences so structural characters inside strings are ignored.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strips non-printable characters from every string value in place,
/// keeping printable ASCII (0x20..=0x7E). Object keys are left untouched so
/// schema validation still sees the expected field names.
pub fn sanitize_string_leaves(value: &mut Value) {
    match value {
        Value::String(s) => {
            if s.chars().any(|c| !matches!(c, '\x20'..='\x7e')) {
                *s = s.chars().filter(|c| matches!(c, '\x20'..='\x7e')).collect();
            }
        }
        Value::Array(items) => {
            for item in items {
                sanitize_string_leaves(item);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                sanitize_string_leaves(item);
            }
        }
        _ => {}
    }
}
