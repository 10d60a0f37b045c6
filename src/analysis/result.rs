use super::parser::{END_MARKER, START_MARKER};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// The nine canonical skin parameters, in prompt order.
pub const PARAMETER_NAMES: [&str; 9] = [
    "Idratazione",
    "Strato lipidico",
    "Elasticità",
    "Cheratina",
    "Pelle sensibile",
    "Macchie cutanee",
    "Tonalità",
    "Densità pilifera",
    "Pori ostruiti",
];

pub const MAX_SCORE: u8 = 100;

/// One scored parameter. Italian field names from older model prompts are
/// accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAssessment {
    #[serde(alias = "valore")]
    pub value: u8,
    #[serde(alias = "descrizione")]
    pub description: String,
    #[serde(alias = "valutazione", alias = "valutazione_professionale")]
    pub evaluation: String,
    #[serde(alias = "consigli")]
    pub advice: String,
}

/// A complete assessment: exactly the nine canonical parameters, each scored
/// within `0..=MAX_SCORE`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, AttributeAssessment>")]
pub struct AnalysisResult {
    assessments: BTreeMap<String, AttributeAssessment>,
}

impl AnalysisResult {
    pub fn get(&self, parameter: &str) -> Option<&AttributeAssessment> {
        self.assessments.get(parameter)
    }

    /// Assessments in canonical parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttributeAssessment)> + '_ {
        PARAMETER_NAMES
            .iter()
            .filter_map(|name| self.assessments.get(*name).map(|a| (*name, a)))
    }

    /// Render in the wire form the parser accepts.
    pub fn to_sentinel(&self) -> serde_json::Result<String> {
        let body = serde_json::to_string(self)?;
        Ok(format!("{START_MARKER} {body} {END_MARKER}"))
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl TryFrom<BTreeMap<String, AttributeAssessment>> for AnalysisResult {
    type Error = String;

    fn try_from(mut map: BTreeMap<String, AttributeAssessment>) -> Result<Self, Self::Error> {
        let mut assessments = BTreeMap::new();
        for name in PARAMETER_NAMES {
            let assessment = map
                .remove(name)
                .ok_or_else(|| format!("missing parameter '{name}'"))?;
            if assessment.value > MAX_SCORE {
                return Err(format!(
                    "parameter '{name}' value {} is outside 0..={MAX_SCORE}",
                    assessment.value
                ));
            }
            assessments.insert(name.to_string(), assessment);
        }
        if !map.is_empty() {
            let extra: Vec<_> = map.into_keys().collect();
            tracing::warn!(extra = ?extra, "Dropping unknown parameters from assessment");
        }
        Ok(Self { assessments })
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.assessments.len()))?;
        for (name, assessment) in self.iter() {
            map.serialize_entry(name, assessment)?;
        }
        map.end()
    }
}
