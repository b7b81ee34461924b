//! parsEPD — turns uploaded Environmental Product Declarations into
//! schema-validated openEPD JSON records.
//!
//! The flow is a fixed chain: extracted text is normalized and screened for
//! prompt-injection content, a classification call decides whether the
//! document is a genuine EPD, and only then does an extraction call produce
//! the structured record, which is recovered from the raw model reply and
//! validated against the bundled openEPD schema. Nothing is persisted
//! beyond the in-memory session.

pub mod config;
pub mod convert;
pub mod guard;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod session;

pub use config::LlmConfig;
pub use guard::{guard_document, GuardReport, DEFAULT_REDACTION_THRESHOLD};
pub use llm::{ChatClient, OpenAiChatClient};
pub use models::{Document, MediaType};
pub use pipeline::{EpdPipeline, PipelineError, PipelineOutcome, RecordStatus};
pub use session::SessionState;
