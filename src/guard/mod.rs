//! The sanitization gate between extracted document text and any model
//! prompt. Normalizer, pattern catalog, detector, and redactor; no other
//! code path may hand raw extracted text to a model.

pub mod detect;
pub mod normalize;
pub mod patterns;
pub mod redact;

pub use detect::{detect_injection, GuardReport, PatternMatch};
pub use normalize::normalize_text;
pub use patterns::{PatternCategory, CATALOG, CATALOG_VERSION};
pub use redact::{redact_injection, REDACTION_SENTINEL};

/// Score at which the detector marks a document suspicious. A single catalog
/// match already reaches it.
pub const SUSPICION_SCORE: u32 = 10;

/// Default score at which the guard redacts instead of merely normalizing.
/// Deliberately above [`SUSPICION_SCORE`]: a lone low-confidence match passes
/// through normalized, repeated matches get redacted.
pub const DEFAULT_REDACTION_THRESHOLD: u32 = 20;

/// Run the gate: detect once, then either redact (recomputed from the
/// *original* text, so redaction and detection can never disagree about
/// normalization) or return the detector's normalized text. Always returns
/// the report for auditability.
pub fn guard_document(text: &str, threshold: u32) -> (String, GuardReport) {
    let report = detect_injection(text);

    if report.match_count > 0 {
        let pattern_ids: Vec<&str> = report.matches.iter().map(|m| m.pattern_id).collect();
        // Pattern ids and counts only — never the matched document content.
        tracing::warn!(
            score = report.score,
            match_count = report.match_count,
            catalog_version = patterns::CATALOG_VERSION,
            patterns = ?pattern_ids,
            "injection patterns detected in document text"
        );
    }

    let clean = if report.score >= threshold {
        redact_injection(text)
    } else {
        report.normalized_text.clone()
    };
    (clean, report)
}
