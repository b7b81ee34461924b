//! Document-to-record pipeline: guard → classify → extract → recover →
//! validate, with per-document caching of stage results.

pub mod classify;
pub mod extract;
pub mod orchestrator;
pub mod recovery;
pub mod validate;

#[cfg(test)]
mod security_tests;

pub use classify::{
    classification_messages, parse_verdict, run_classification, ClassificationVerdict,
};
pub use extract::{extraction_messages, run_extraction};
pub use orchestrator::{EpdPipeline, ExtractionOutcome, PipelineOutcome, RecordStatus};
pub use recovery::{recover_json, sanitize_string_leaves};
pub use validate::{SchemaValidator, SchemaVerdict, OPENEPD_SCHEMA};

use thiserror::Error;

use crate::convert::ConversionError;
use crate::llm::TransportError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Document conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("LLM transport failed during {stage}: {source}")]
    Transport {
        stage: &'static str,
        source: TransportError,
    },

    #[error("Input text too short for processing ({0} characters)")]
    InputTooShort(usize),

    #[error("openEPD schema failed to compile: {0}")]
    SchemaCompile(String),
}
