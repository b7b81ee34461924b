use serde::Serialize;

use super::normalize::normalize_text;
use super::patterns::CATALOG;
use super::SUSPICION_SCORE;

/// Context captured on each side of a match for audit logging.
const SNIPPET_CONTEXT: usize = 40;

/// One catalog hit, with enough surrounding text to audit it.
#[derive(Debug, Clone, Serialize)]
pub struct PatternMatch {
    pub pattern_id: &'static str,
    pub snippet: String,
}

/// Outcome of scanning one document. Computed once per document, read-only
/// thereafter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GuardReport {
    pub is_suspicious: bool,
    pub score: u32,
    pub match_count: usize,
    pub matches: Vec<PatternMatch>,
    pub normalized_text: String,
}

/// Scan normalized text against the injection catalog. Every match of every
/// pattern is recorded; the score saturates at 100 and is not weighted by
/// pattern severity.
pub fn detect_injection(text: &str) -> GuardReport {
    let normalized = normalize_text(text);

    let mut matches = Vec::new();
    for pattern in CATALOG.iter() {
        for m in pattern.regex.find_iter(&normalized) {
            matches.push(PatternMatch {
                pattern_id: pattern.id,
                snippet: snippet_around(&normalized, m.start(), m.end()),
            });
        }
    }

    let score = (matches.len() as u32).saturating_mul(10).min(100);

    GuardReport {
        is_suspicious: score >= SUSPICION_SCORE,
        score,
        match_count: matches.len(),
        matches,
        normalized_text: normalized,
    }
}

/// Slice `SNIPPET_CONTEXT` bytes of context on each side of a match,
/// widened to the nearest character boundaries.
fn snippet_around(text: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(SNIPPET_CONTEXT);
    while from > 0 && !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + SNIPPET_CONTEXT).min(text.len());
    while to < text.len() && !text.is_char_boundary(to) {
        to += 1;
    }
    text[from..to].to_string()
}
