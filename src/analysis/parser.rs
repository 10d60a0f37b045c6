//! Extract and validate the structured assessment from raw model text.
//!
//! The model wraps its JSON answer between two sentinel markers. Anything
//! outside the markers is ignored; the first start marker and the first end
//! marker after it delimit the payload.

use super::result::{AnalysisResult, AttributeAssessment, PARAMETER_NAMES};
use crate::error::{AnalysisError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const START_MARKER: &str = "<attribute=analysis_result|";
pub const END_MARKER: &str = "| attribute=analysis_result>";

/// Parse raw model output into a validated [`AnalysisResult`].
///
/// Missing or misordered markers and non-JSON payloads are
/// [`AnalysisError::Format`]; well-formed JSON that breaks the parameter
/// contract is [`AnalysisError::Schema`].
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult> {
    let payload = extract_payload(raw)?;

    let value: Value = serde_json::from_str(payload)
        .map_err(|e| AnalysisError::Format(format!("payload is not valid JSON: {e}")))?;

    let Value::Object(object) = value else {
        return Err(AnalysisError::Schema(format!(
            "payload must be a JSON object, got {}",
            json_kind(&value)
        )));
    };

    validate(object)
}

/// The trimmed text between the first start marker and the first end marker
/// that follows it.
pub fn extract_payload(raw: &str) -> Result<&str> {
    let Some(start) = raw.find(START_MARKER) else {
        return Err(AnalysisError::Format("start marker not found".into()));
    };
    let body_start = start + START_MARKER.len();

    let Some(end) = raw[body_start..].find(END_MARKER) else {
        let message = if raw[..start].contains(END_MARKER) {
            "end marker appears before start marker"
        } else {
            "end marker not found"
        };
        return Err(AnalysisError::Format(message.into()));
    };

    let payload = raw[body_start..body_start + end].trim();
    if payload.is_empty() {
        return Err(AnalysisError::Format("empty payload between markers".into()));
    }
    Ok(payload)
}

fn validate(mut object: Map<String, Value>) -> Result<AnalysisResult> {
    let mut assessments = BTreeMap::new();
    for name in PARAMETER_NAMES {
        let entry = object
            .remove(name)
            .ok_or_else(|| AnalysisError::Schema(format!("missing parameter '{name}'")))?;
        assessments.insert(name.to_string(), validate_entry(name, entry)?);
    }
    if !object.is_empty() {
        tracing::debug!(
            extra = ?object.keys().collect::<Vec<_>>(),
            "Ignoring unknown parameters in model output"
        );
    }
    AnalysisResult::try_from(assessments).map_err(AnalysisError::Schema)
}

fn validate_entry(name: &str, entry: Value) -> Result<AttributeAssessment> {
    if !entry.is_object() {
        return Err(AnalysisError::Schema(format!(
            "parameter '{name}' must be an object, got {}",
            json_kind(&entry)
        )));
    }
    serde_json::from_value(entry)
        .map_err(|e| AnalysisError::Schema(format!("parameter '{name}': {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
