use super::normalize::normalize_text;
use super::patterns::CATALOG;

/// Replacement for any line that trips the catalog. Deliberately loud so a
/// reader of the guarded text can see something was removed.
pub const REDACTION_SENTINEL: &str = "[[redacted: potential prompt-injection line removed]]";

/// Line-level redaction: normalize, then drop every line that any catalog
/// pattern matches anywhere. Intentionally coarse — one matching token costs
/// the whole line, trading recall of legitimate content for zero false
/// negatives on flagged lines.
pub fn redact_injection(text: &str) -> String {
    let normalized = normalize_text(text);
    let redacted: Vec<&str> = normalized
        .lines()
        .map(|line| {
            if CATALOG.iter().any(|p| p.regex.is_match(line)) {
                REDACTION_SENTINEL
            } else {
                line
            }
        })
        .collect();
    redacted.join("\n").trim().to_string()
}
