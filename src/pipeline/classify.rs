//! Classification stage: decide whether the uploaded document is a genuine
//! Environmental Product Declaration before any extraction is attempted.

use serde::Serialize;

use crate::llm::{ChatClient, CompletionParams, TransportError};
use crate::models::ConversationTurn;

/// Marker the model is instructed to emit for a genuine declaration. The
/// verdict is a case-insensitive substring check, so decorated replies
/// ("✅VALID EPD") still count.
pub const VALID_MARKER: &str = "VALID EPD";

/// System rubric for the classification call.
pub const CLASSIFICATION_RUBRIC: &str = r#"
You are an expert in environmental declarations and standards. Your task is to strictly validate whether the following document is an Environmental Product Declaration (EPD).

Definition of an EPD:
An EPD is a standardized, third-party verified document that:
Complies with ISO 14025 and EN 15804.
References a valid Product Category Rule (PCR).
Declares a declared unit or functional unit.
Provides quantified LCIA indicators (e.g., GWP, ODP, AP).
Identifies a program operator and a verification statement.
Has a clearly defined validity period and issue date.
Important:
Do NOT classify the document as an EPD if it is:
A Life Cycle Assessment (LCA) report
A technical report (even if it contains environmental data)
A product brochure or marketing material
A sustainability or research paper
Presence of environmental data alone is not sufficient. An EPD must be a formal declaration document with explicit EPD structure and identifiers.
Task:
Respond with 'VALID EPD' if the document meets EPD requirements, or 'NOT AN EPD' if it does not.
Then, in 1-2 sentences, explain your reasoning by citing specific indicators from the text.
"#;

/// Outcome of the classification stage. `raw_reply` is kept verbatim for the
/// transcript; `is_valid_epd` gates extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationVerdict {
    pub raw_reply: String,
    pub is_valid_epd: bool,
}

/// Builds the two-turn classification conversation for a guarded document.
pub fn classification_messages(guarded_text: &str) -> Vec<ConversationTurn> {
    vec![
        ConversationTurn::system(CLASSIFICATION_RUBRIC),
        ConversationTurn::user(guarded_text),
    ]
}

/// Fail-closed verdict parsing: only an explicit valid marker accepts the
/// document, anything else (including an empty reply) rejects it.
pub fn parse_verdict(reply: &str) -> ClassificationVerdict {
    let is_valid_epd = reply.to_lowercase().contains(&VALID_MARKER.to_lowercase());
    ClassificationVerdict {
        raw_reply: reply.to_owned(),
        is_valid_epd,
    }
}

pub fn run_classification(
    chat: &dyn ChatClient,
    guarded_text: &str,
) -> Result<ClassificationVerdict, TransportError> {
    let messages = classification_messages(guarded_text);
    let reply = chat.complete(&messages, CompletionParams::deterministic())?;
    Ok(parse_verdict(&reply))
}
