//! Orchestrates the full document pipeline:
//! guard → classify → extract → recover → validate.
//!
//! Stage results are cached in the session per document fingerprint, so
//! reprocessing the same upload never repeats an LLM call.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::convert::DocumentConverter;
use crate::guard::{guard_document, GuardReport, DEFAULT_REDACTION_THRESHOLD};
use crate::llm::ChatClient;
use crate::models::{ConversationTurn, Document, MediaType};
use crate::session::SessionState;

use super::classify::{run_classification, ClassificationVerdict};
use super::extract::run_extraction;
use super::recovery::{recover_json, sanitize_string_leaves};
use super::validate::{SchemaValidator, SchemaVerdict};
use super::PipelineError;

/// Documents shorter than this cannot plausibly be a declaration.
pub const MIN_INPUT_LENGTH: usize = 10;

/// Guarded text is truncated to this many characters before prompting.
pub const MAX_INPUT_LENGTH: usize = 50_000;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// What became of the extraction reply.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    /// The reply yielded a JSON record (schema verdict attached).
    Parsed { record: Value, schema: SchemaVerdict },
    /// No JSON object could be recovered from the reply.
    Unparsable { reason: String },
}

/// Extraction stage result, cached per document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub raw_reply: String,
    pub record: RecordStatus,
}

/// Everything a caller needs to render after one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub guard: GuardReport,
    pub verdict: ClassificationVerdict,
    /// `None` when classification rejected the document.
    pub extraction: Option<ExtractionOutcome>,
}

// ═══════════════════════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════════════════════

pub struct EpdPipeline {
    chat: Box<dyn ChatClient + Send + Sync>,
    validator: SchemaValidator,
    redaction_threshold: u32,
}

impl EpdPipeline {
    pub fn new(chat: Box<dyn ChatClient + Send + Sync>) -> Result<Self, PipelineError> {
        Ok(Self {
            chat,
            validator: SchemaValidator::bundled()?,
            redaction_threshold: DEFAULT_REDACTION_THRESHOLD,
        })
    }

    pub fn with_redaction_threshold(mut self, threshold: u32) -> Self {
        self.redaction_threshold = threshold;
        self
    }

    /// Converts uploaded bytes and runs the pipeline on the result.
    /// Conversion failure is terminal for the upload.
    pub fn process_upload(
        &self,
        session: &mut SessionState,
        converter: &dyn DocumentConverter,
        bytes: &[u8],
        media_type: MediaType,
    ) -> Result<(Document, PipelineOutcome), PipelineError> {
        let document = Document::from_bytes(converter, bytes, media_type)?;
        let outcome = self.process_document(session, &document)?;
        Ok((document, outcome))
    }

    /// Runs the pipeline for `document`, reusing any cached stage results
    /// when the document is already installed in the session.
    pub fn process_document(
        &self,
        session: &mut SessionState,
        document: &Document,
    ) -> Result<PipelineOutcome, PipelineError> {
        let span = tracing::info_span!("process_document", doc_id = %document.fingerprint);
        let _enter = span.enter();

        if document.extracted_text.trim().len() < MIN_INPUT_LENGTH {
            return Err(PipelineError::InputTooShort(
                document.extracted_text.trim().len(),
            ));
        }

        if !session.is_current(document) {
            let started = Instant::now();
            let (mut guarded_text, report) =
                guard_document(&document.extracted_text, self.redaction_threshold);
            truncate_at_word_boundary(&mut guarded_text, MAX_INPUT_LENGTH);
            tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                score = report.score,
                "document guarded"
            );
            session.install_document(document, guarded_text, report);
        }

        // Redaction can hollow out a short hostile document entirely.
        let guarded_len = session
            .document()
            .map(|d| d.guarded_text.trim().len())
            .unwrap_or(0);
        if guarded_len < MIN_INPUT_LENGTH {
            return Err(PipelineError::InputTooShort(guarded_len));
        }

        let verdict = self.classification_for(session)?;
        if !verdict.is_valid_epd {
            tracing::info!("classification rejected document, skipping extraction");
            return Ok(PipelineOutcome {
                guard: self.guard_snapshot(session),
                verdict,
                extraction: None,
            });
        }

        let extraction = self.extraction_for(session)?;
        Ok(PipelineOutcome {
            guard: self.guard_snapshot(session),
            verdict,
            extraction: Some(extraction),
        })
    }

    fn guard_snapshot(&self, session: &SessionState) -> GuardReport {
        session
            .document()
            .map(|d| d.guard.clone())
            .unwrap_or_default()
    }

    fn classification_for(
        &self,
        session: &mut SessionState,
    ) -> Result<ClassificationVerdict, PipelineError> {
        if let Some(cached) = session.verdict() {
            return Ok(cached.clone());
        }
        let guarded = session
            .document()
            .map(|d| d.guarded_text.clone())
            .unwrap_or_default();

        let started = Instant::now();
        let verdict = run_classification(self.chat.as_ref(), &guarded).map_err(|source| {
            PipelineError::Transport {
                stage: "classification",
                source,
            }
        })?;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            prompt_chars = guarded.len(),
            is_valid_epd = verdict.is_valid_epd,
            "classification complete"
        );

        session.push_turn(ConversationTurn::assistant(&verdict.raw_reply));
        session.record_verdict(verdict.clone());
        Ok(verdict)
    }

    fn extraction_for(
        &self,
        session: &mut SessionState,
    ) -> Result<ExtractionOutcome, PipelineError> {
        if let Some(cached) = session.extraction() {
            return Ok(cached.clone());
        }
        let guarded = session
            .document()
            .map(|d| d.guarded_text.clone())
            .unwrap_or_default();

        let started = Instant::now();
        let raw_reply = run_extraction(self.chat.as_ref(), &guarded).map_err(|source| {
            PipelineError::Transport {
                stage: "extraction",
                source,
            }
        })?;

        let candidate = recover_json(&raw_reply);
        let record = match serde_json::from_str::<Value>(&candidate) {
            Ok(mut record) => {
                sanitize_string_leaves(&mut record);
                let schema = self.validator.validate(&record);
                RecordStatus::Parsed { record, schema }
            }
            Err(e) => RecordStatus::Unparsable {
                reason: e.to_string(),
            },
        };
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            prompt_chars = guarded.len(),
            parsed = matches!(record, RecordStatus::Parsed { .. }),
            "extraction complete"
        );

        let outcome = ExtractionOutcome { raw_reply, record };
        session.record_extraction(outcome.clone());
        Ok(outcome)
    }
}

/// Truncates in place without splitting a word; falls back to a plain char
/// boundary when the text has no whitespace to break at.
fn truncate_at_word_boundary(text: &mut String, max_chars: usize) {
    if text.chars().count() <= max_chars {
        return;
    }
    let hard_end = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let cut = text[..hard_end]
        .rfind(char::is_whitespace)
        .unwrap_or(hard_end);
    text.truncate(cut);
    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
}
