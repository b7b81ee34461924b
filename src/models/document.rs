use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::convert::{ConversionError, DocumentConverter};

/// Upload formats accepted for EPD documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Pdf,
    Html,
}

impl MediaType {
    /// Map an uploaded file name to a media type, if supported.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if lower.ends_with(".html") || lower.ends_with(".htm") {
            Some(Self::Html)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// One uploaded document after text extraction. Immutable once created; the
/// raw bytes are dropped as soon as conversion succeeds and nothing is
/// persisted beyond the session.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Identity of this upload; all derived session state is keyed on it.
    pub fingerprint: Uuid,
    pub media_type: MediaType,
    pub uploaded_at: DateTime<Utc>,
    pub extracted_text: String,
}

impl Document {
    /// Wrap already-extracted text.
    pub fn from_text(media_type: MediaType, extracted_text: impl Into<String>) -> Self {
        Self {
            fingerprint: Uuid::new_v4(),
            media_type,
            uploaded_at: Utc::now(),
            extracted_text: extracted_text.into(),
        }
    }

    /// Convert uploaded bytes through an external converter. Conversion
    /// failure is terminal for the upload.
    pub fn from_bytes(
        converter: &dyn DocumentConverter,
        bytes: &[u8],
        media_type: MediaType,
    ) -> Result<Self, ConversionError> {
        let text = converter.convert(bytes, media_type)?;
        Ok(Self::from_text(media_type, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::PlainTextConverter;

    #[test]
    fn media_type_from_file_name() {
        assert_eq!(MediaType::from_file_name("epd.pdf"), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_file_name("EPD.PDF"), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_file_name("page.html"), Some(MediaType::Html));
        assert_eq!(MediaType::from_file_name("page.htm"), Some(MediaType::Html));
        assert_eq!(MediaType::from_file_name("notes.docx"), None);
    }

    #[test]
    fn documents_get_distinct_fingerprints() {
        let a = Document::from_text(MediaType::Pdf, "same text");
        let b = Document::from_text(MediaType::Pdf, "same text");
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn from_bytes_runs_the_converter() {
        let doc =
            Document::from_bytes(&PlainTextConverter, b"declared unit: 1 m3", MediaType::Html)
                .unwrap();
        assert_eq!(doc.extracted_text, "declared unit: 1 m3");
        assert_eq!(doc.media_type, MediaType::Html);
    }
}
