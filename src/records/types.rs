use crate::analysis::AnalysisResult;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Local wall-clock format used for history timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored assessment.
///
/// `result` is kept as raw JSON so entries written by older releases, with
/// different field names, survive a load/save cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub result: Value,
}

impl HistoryEntry {
    pub fn new(result: &AnalysisResult, at: DateTime<Local>) -> serde_json::Result<Self> {
        Ok(Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            result: result.to_value()?,
        })
    }

    /// Decode the stored result, if it matches the current shape.
    pub fn analysis(&self) -> Option<AnalysisResult> {
        serde_json::from_value(self.result.clone()).ok()
    }
}

/// An entity in a scope's record file. Only `id` and the history are
/// interpreted; every other field is carried through as-is.
///
/// `analysis_history` is written back exactly when it was read, so saving a
/// scope never adds or drops the key on records a merge did not touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    id: Value,
    #[serde(
        rename = "analysis_history",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    history: Option<Vec<HistoryEntry>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EntityRecord {
    /// A fresh record with an empty `analysis_history`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Value::String(id.into()),
            history: Some(Vec::new()),
            fields: Map::new(),
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.as_deref().unwrap_or_default()
    }

    pub fn into_history(self) -> Vec<HistoryEntry> {
        self.history.unwrap_or_default()
    }

    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.get_or_insert_with(Vec::new).push(entry);
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// The id as text. Numeric ids render without quotes.
    pub fn id(&self) -> String {
        match &self.id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }

    pub fn has_id(&self, entity_id: &str) -> bool {
        match &self.id {
            Value::String(id) => id == entity_id,
            Value::Number(n) => n.to_string() == entity_id,
            _ => false,
        }
    }
}
