//! DataMerger - extraction batches and manual overrides into one record
//!
//! ## Precedence
//!
//! The record is always rebuilt in a fixed order:
//! 1. Extraction batches in upload order. A field only lands if it carries a
//!    real value, so a later batch never blanks out earlier data.
//! 2. Manual overrides on top. A non-empty override always wins; clearing an
//!    override lets the extracted value show through again.
//!
//! Overrides are kept as the raw text the user typed so the input can be
//! shown back unchanged; coercion to a number happens at merge time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::presence::is_present;
use crate::types::{FieldId, FieldValue, MergedRecord, RawFields, Scalar};

/// Source of an incoming field map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Extraction,
    Manual,
}

/// Merge `incoming` onto `base` according to `origin`.
///
/// Extraction values are untrusted: null, blank, zero and non-scalar values
/// are dropped. Manual values are coerced with `Scalar::from_manual`; blank
/// manual input is no override at all.
pub fn merge(base: &MergedRecord, incoming: &RawFields, origin: Origin) -> MergedRecord {
    let mut merged = base.clone();
    for (field, raw) in incoming {
        let value = match origin {
            Origin::Extraction => Scalar::from_json(raw)
                .filter(is_present)
                .map(FieldValue::extracted),
            Origin::Manual => manual_scalar(raw).map(FieldValue::manual),
        };
        match value {
            Some(v) => merged.insert(field.clone(), v),
            None => debug!(field = %field, ?origin, "Skipping field without value"),
        }
    }
    merged
}

fn manual_scalar(raw: &serde_json::Value) -> Option<Scalar> {
    match raw {
        serde_json::Value::String(s) => Scalar::from_manual(s),
        other => Scalar::from_json(other),
    }
}

/// Layered store behind one incident's `MergedRecord`.
#[derive(Debug, Clone, Default)]
pub struct DataMerger {
    batches: Vec<RawFields>,
    overrides: BTreeMap<FieldId, String>,
}

impl DataMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one extraction batch. Returns how many of its fields carry a value.
    pub fn add_extraction(&mut self, batch: RawFields) -> usize {
        let usable = batch
            .values()
            .filter_map(Scalar::from_json)
            .filter(is_present)
            .count();
        self.batches.push(batch);
        usable
    }

    /// Set or clear (blank `raw`) the manual override for `field`.
    pub fn set_manual(&mut self, field: FieldId, raw: &str) {
        if raw.trim().is_empty() {
            self.overrides.remove(&field);
        } else {
            self.overrides.insert(field, raw.to_string());
        }
    }

    /// The text the user typed for `field`, if any.
    pub fn manual_input(&self, field: &str) -> Option<&str> {
        self.overrides.get(field).map(String::as_str)
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Drop every batch and override.
    pub fn clear(&mut self) {
        self.batches.clear();
        self.overrides.clear();
    }

    /// Rebuild the authoritative record.
    pub fn record(&self) -> MergedRecord {
        let extracted = self
            .batches
            .iter()
            .fold(MergedRecord::new(), |acc, batch| merge(&acc, batch, Origin::Extraction));

        let manual: RawFields = self
            .overrides
            .iter()
            .map(|(field, raw)| (field.clone(), serde_json::Value::String(raw.clone())))
            .collect();
        merge(&extracted, &manual, Origin::Manual)
    }
}
