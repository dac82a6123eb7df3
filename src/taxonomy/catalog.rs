//! Field labels and units for display. Never consulted by merge or validation.

use std::collections::HashMap;

use crate::config::TaxonomyConfig;
use crate::types::FieldId;

#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    entries: HashMap<FieldId, (String, Option<String>)>,
}

impl FieldCatalog {
    pub fn from_config(config: &TaxonomyConfig) -> Self {
        Self {
            entries: config
                .fields
                .iter()
                .map(|f| (f.id.clone(), (f.label.clone(), f.unit.clone())))
                .collect(),
        }
    }

    /// Human-readable label, falling back to the raw id.
    pub fn label<'a>(&'a self, field: &'a str) -> &'a str {
        self.entries.get(field).map_or(field, |(label, _)| label.as_str())
    }

    pub fn unit(&self, field: &str) -> Option<&str> {
        self.entries.get(field).and_then(|(_, unit)| unit.as_deref())
    }

    /// `"Mud Weight (ppg)"`, or just the label when the field has no unit.
    pub fn describe(&self, field: &str) -> String {
        match self.unit(field) {
            Some(unit) => format!("{} ({unit})", self.label(field)),
            None => self.label(field).to_string(),
        }
    }
}
