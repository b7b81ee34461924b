//! Rendering helpers for pipeline results: pretty JSON for display, a
//! one-line validity banner, and download bytes for the extracted record.

use serde_json::Value;

use crate::pipeline::SchemaVerdict;

/// Pretty-printed record for on-screen display. Serialization of a `Value`
/// cannot realistically fail, but a fallback beats a panic in render code.
pub fn render_record(record: &Value) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string())
}

/// One-line schema verdict for the UI.
pub fn validity_banner(verdict: &SchemaVerdict) -> String {
    match (&verdict.valid, &verdict.reason) {
        (true, _) => "valid".to_owned(),
        (false, Some(reason)) => format!("invalid: {reason}"),
        (false, None) => "invalid".to_owned(),
    }
}

/// Record serialized for file download.
pub fn download_bytes(record: &Value) -> Vec<u8> {
    serde_json::to_vec_pretty(record).unwrap_or_else(|_| record.to_string().into_bytes())
}
