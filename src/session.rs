//! Per-session state: the conversation transcript and the current document.
//!
//! A session holds at most one document at a time. Installing a new document
//! is atomic with respect to the rest of the state: the transcript and any
//! cached stage results for the previous document are dropped in the same
//! call, so stale verdicts can never be attributed to a new upload.

use uuid::Uuid;

use crate::guard::GuardReport;
use crate::models::{ConversationTurn, Document};
use crate::pipeline::{ClassificationVerdict, ExtractionOutcome};

/// Everything the pipeline has learned about the currently installed
/// document, keyed by the upload fingerprint.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub fingerprint: Uuid,
    /// Text as forwarded to the model: normalized, possibly redacted,
    /// possibly truncated.
    pub guarded_text: String,
    pub guard: GuardReport,
    verdict: Option<ClassificationVerdict>,
    extraction: Option<ExtractionOutcome>,
}

#[derive(Debug, Default)]
pub struct SessionState {
    conversation: Vec<ConversationTurn>,
    document: Option<DocumentState>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears everything, equivalent to a fresh session.
    pub fn start_over(&mut self) {
        *self = Self::default();
    }

    /// Installs a new document, discarding the transcript and any cached
    /// results for the previous one in the same step.
    pub fn install_document(&mut self, document: &Document, guarded_text: String, guard: GuardReport) {
        self.conversation.clear();
        self.document = Some(DocumentState {
            fingerprint: document.fingerprint,
            guarded_text,
            guard,
            verdict: None,
            extraction: None,
        });
    }

    /// True when `document` is the one currently installed.
    pub fn is_current(&self, document: &Document) -> bool {
        self.document
            .as_ref()
            .is_some_and(|d| d.fingerprint == document.fingerprint)
    }

    pub fn document(&self) -> Option<&DocumentState> {
        self.document.as_ref()
    }

    pub fn push_turn(&mut self, turn: ConversationTurn) {
        self.conversation.push(turn);
    }

    pub fn conversation(&self) -> &[ConversationTurn] {
        &self.conversation
    }

    pub fn verdict(&self) -> Option<&ClassificationVerdict> {
        self.document.as_ref().and_then(|d| d.verdict.as_ref())
    }

    pub fn record_verdict(&mut self, verdict: ClassificationVerdict) {
        if let Some(doc) = self.document.as_mut() {
            doc.verdict = Some(verdict);
        }
    }

    pub fn extraction(&self) -> Option<&ExtractionOutcome> {
        self.document.as_ref().and_then(|d| d.extraction.as_ref())
    }

    pub fn record_extraction(&mut self, outcome: ExtractionOutcome) {
        if let Some(doc) = self.document.as_mut() {
            doc.extraction = Some(outcome);
        }
    }
}
