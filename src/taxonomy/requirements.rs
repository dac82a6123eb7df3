//! Required-field resolution for a (phase, incident type) pair

use serde::Serialize;
use std::collections::HashMap;

use crate::config::TaxonomyConfig;
use crate::types::{FieldId, IncidentTypeId, PhaseId};

/// Fields an incident must carry before it can be classified.
///
/// `baseline` is phase-level (every field required); `specific` is
/// type-level (at least one required). Both are ordered and duplicate free;
/// they may share fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldRequirementSet {
    pub baseline: Vec<FieldId>,
    pub specific: Vec<FieldId>,
}

#[derive(Debug, Clone, Default)]
pub struct RequirementResolver {
    baseline: HashMap<PhaseId, Vec<FieldId>>,
    specific: HashMap<IncidentTypeId, Vec<FieldId>>,
}

impl RequirementResolver {
    pub fn from_config(config: &TaxonomyConfig) -> Self {
        let mut resolver = Self::default();
        for phase in &config.phases {
            resolver.baseline.insert(phase.id.clone(), dedup(&phase.baseline));
            for kind in &phase.incident_types {
                resolver.specific.insert(kind.id.clone(), dedup(&kind.specific));
            }
        }
        resolver
    }

    /// Phase-level fields; empty for an unknown phase.
    pub fn baseline(&self, phase: &str) -> &[FieldId] {
        self.baseline.get(phase).map(Vec::as_slice).unwrap_or_default()
    }

    /// Type-level fields; empty for an unknown type.
    pub fn specific(&self, incident_type: &str) -> &[FieldId] {
        self.specific.get(incident_type).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn resolve(&self, phase: &str, incident_type: &str) -> FieldRequirementSet {
        FieldRequirementSet {
            baseline: self.baseline(phase).to_vec(),
            specific: self.specific(incident_type).to_vec(),
        }
    }
}

fn dedup(fields: &[FieldId]) -> Vec<FieldId> {
    let mut out: Vec<FieldId> = Vec::with_capacity(fields.len());
    for f in fields {
        if !out.contains(f) {
            out.push(f.clone());
        }
    }
    out
}
