//! openEPD schema validation for recovered records.

use serde_json::Value;

use super::PipelineError;

/// Bundled openEPD document schema (draft-07). Compiled once per validator.
pub const OPENEPD_SCHEMA: &str = include_str!("../../schema/openepd.schema.json");

/// Result of validating a recovered record. `reason` carries the first
/// violation only; one actionable message beats a wall of errors.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaVerdict {
    pub valid: bool,
    pub reason: Option<String>,
}

pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Compiles the bundled openEPD schema.
    pub fn bundled() -> Result<Self, PipelineError> {
        let schema: Value = serde_json::from_str(OPENEPD_SCHEMA)
            .map_err(|e| PipelineError::SchemaCompile(e.to_string()))?;
        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| PipelineError::SchemaCompile(e.to_string()))?;
        Ok(Self { validator })
    }

    pub fn validate(&self, record: &Value) -> SchemaVerdict {
        match self.validator.iter_errors(record).next() {
            None => SchemaVerdict {
                valid: true,
                reason: None,
            },
            Some(err) => SchemaVerdict {
                valid: false,
                reason: Some(format!("{} at '{}'", err, err.instance_path)),
            },
        }
    }
}
