//! Document byte-to-text conversion seam.
//!
//! Uploads arrive as raw bytes plus a media type; everything downstream of
//! [`crate::models::Document::from_bytes`] works on extracted text only. The
//! trait keeps the pipeline testable without a real PDF or HTML backend.

use thiserror::Error;

use crate::models::MediaType;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("unsupported media type: {0}")]
    Unsupported(String),
    #[error("unreadable document: {0}")]
    Unreadable(String),
}

/// Converts uploaded bytes into plain text for a given media type.
pub trait DocumentConverter {
    fn convert(&self, bytes: &[u8], media_type: MediaType) -> Result<String, ConversionError>;
}

/// Passthrough converter for already-textual payloads. Used by the CLI for
/// text files and by tests; a real deployment plugs in PDF/HTML converters
/// behind the same trait.
pub struct PlainTextConverter;

impl DocumentConverter for PlainTextConverter {
    fn convert(&self, bytes: &[u8], _media_type: MediaType) -> Result<String, ConversionError> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| ConversionError::Unreadable(format!("invalid UTF-8: {e}")))
    }
}
