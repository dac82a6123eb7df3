//! Field values and the merged intake record

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::FieldId;

/// Raw field/value map as delivered by the extraction service.
///
/// Untrusted: values may be null, blank, zero placeholders or nested JSON.
pub type RawFields = BTreeMap<FieldId, serde_json::Value>;

/// A single scalar reading or free-text entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Convert an extraction value into a scalar.
    ///
    /// Null, arrays and objects have no scalar form. Booleans become text.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
        }
    }

    /// Coerce free-text manual input.
    ///
    /// Trimmed text that parses as a finite number becomes `Number`; anything
    /// else (dates, notes) is kept verbatim. Returns `None` for blank input.
    pub fn from_manual(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Self::Number(n)),
            _ => Some(Self::Text(raw.to_string())),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Where a value came from. Shown in the UI only; precedence is decided by
/// merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Extracted,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Scalar,
    pub provenance: Provenance,
}

impl FieldValue {
    pub fn extracted(value: Scalar) -> Self {
        Self { value, provenance: Provenance::Extracted }
    }

    pub fn manual(value: Scalar) -> Self {
        Self { value, provenance: Provenance::Manual }
    }
}

/// Authoritative field map for one incident.
///
/// Ordered by field id so iteration, serialization and validation output
/// never depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedRecord(BTreeMap<FieldId, FieldValue>);

impl MergedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn value(&self, field: &str) -> Option<&Scalar> {
        self.0.get(field).map(|v| &v.value)
    }

    pub fn insert(&mut self, field: FieldId, value: FieldValue) {
        self.0.insert(field, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &FieldValue)> {
        self.0.iter()
    }

    /// Plain field -> scalar view handed to the orchestrator.
    pub fn to_parameters(&self) -> BTreeMap<FieldId, Scalar> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }
}
