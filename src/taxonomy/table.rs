//! Phase / incident type / family registry

use std::collections::HashMap;

use crate::config::{ConfigError, TaxonomyConfig};
use crate::types::{FamilyId, IncidentTypeId, PhaseId};

#[derive(Debug, Clone)]
pub struct PhaseEntry {
    pub id: PhaseId,
    pub label: String,
    pub incident_types: Vec<IncidentTypeId>,
}

#[derive(Debug, Clone)]
pub struct IncidentTypeEntry {
    pub id: IncidentTypeId,
    pub label: String,
    pub phase: PhaseId,
    pub family: FamilyId,
}

/// Immutable registry built once from the rule tables.
#[derive(Debug, Clone)]
pub struct TaxonomyTable {
    phases: Vec<PhaseEntry>,
    incident_types: HashMap<IncidentTypeId, IncidentTypeEntry>,
    family_labels: HashMap<FamilyId, String>,
}

impl TaxonomyTable {
    pub fn from_config(config: &TaxonomyConfig) -> Result<Self, ConfigError> {
        let family_labels: HashMap<FamilyId, String> = config
            .families
            .iter()
            .map(|f| (f.id.clone(), f.label.clone()))
            .collect();

        let mut errors = Vec::new();
        let mut incident_types = HashMap::new();
        let mut phases = Vec::with_capacity(config.phases.len());

        for phase in &config.phases {
            if phase.incident_types.is_empty() {
                errors.push(format!("phase '{}' has no incident types", phase.id));
            }
            for kind in &phase.incident_types {
                if !family_labels.contains_key(&kind.family) {
                    errors.push(format!(
                        "incident type '{}' references unknown family '{}'",
                        kind.id, kind.family
                    ));
                }
                let entry = IncidentTypeEntry {
                    id: kind.id.clone(),
                    label: kind.label.clone(),
                    phase: phase.id.clone(),
                    family: kind.family.clone(),
                };
                if incident_types.insert(kind.id.clone(), entry).is_some() {
                    errors.push(format!("incident type '{}' declared more than once", kind.id));
                }
            }
            phases.push(PhaseEntry {
                id: phase.id.clone(),
                label: phase.label.clone(),
                incident_types: phase.incident_types.iter().map(|t| t.id.clone()).collect(),
            });
        }

        if errors.is_empty() {
            Ok(Self { phases, incident_types, family_labels })
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Phases in declaration order.
    pub fn phases(&self) -> &[PhaseEntry] {
        &self.phases
    }

    pub fn phase(&self, phase: &str) -> Option<&PhaseEntry> {
        self.phases.iter().find(|p| p.id.as_str() == phase)
    }

    /// Incident types of a phase in declaration order; empty for unknown phases.
    pub fn incident_types(&self, phase: &str) -> Vec<&IncidentTypeEntry> {
        self.phase(phase)
            .map(|p| {
                p.incident_types
                    .iter()
                    .filter_map(|id| self.incident_types.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn incident_type(&self, incident_type: &str) -> Option<&IncidentTypeEntry> {
        self.incident_types.get(incident_type)
    }

    pub fn phase_of(&self, incident_type: &str) -> Option<&PhaseId> {
        self.incident_types.get(incident_type).map(|t| &t.phase)
    }

    /// Causal family of an incident type. Always looked up, never cached by callers.
    pub fn family_of(&self, incident_type: &str) -> Option<&FamilyId> {
        self.incident_types.get(incident_type).map(|t| &t.family)
    }

    pub fn family_label(&self, family: &str) -> Option<&str> {
        self.family_labels.get(family).map(String::as_str)
    }

    pub fn belongs_to(&self, incident_type: &str, phase: &str) -> bool {
        self.phase_of(incident_type).is_some_and(|p| p.as_str() == phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FamilyDef, IncidentTypeDef, PhaseDef};

    fn builtin() -> TaxonomyTable {
        TaxonomyTable::from_config(&TaxonomyConfig::builtin().unwrap()).unwrap()
    }

    #[test]
    fn every_phase_has_incident_types() {
        let table = builtin();
        for phase in table.phases() {
            assert!(
                !table.incident_types(phase.id.as_str()).is_empty(),
                "phase {} has no types",
                phase.id
            );
        }
    }

    #[test]
    fn family_lookup_is_stable() {
        let table = builtin();
        let first = table.family_of("stuck_pipe").cloned();
        let _ = table.family_of("kick");
        let _ = table.incident_types("workover");
        assert_eq!(table.family_of("stuck_pipe").cloned(), first);
        assert_eq!(first.as_ref().map(FamilyId::as_str), Some("mechanical"));
        assert_eq!(table.family_label("mechanical"), Some("Mechanical"));
    }

    #[test]
    fn unknown_keys_yield_nothing() {
        let table = builtin();
        assert!(table.incident_types("exploration").is_empty());
        assert!(table.family_of("alien_abduction").is_none());
        assert!(!table.belongs_to("stuck_pipe", "workover"));
        assert!(table.belongs_to("stuck_pipe", "drilling"));
    }

    #[test]
    fn rejects_unknown_family_and_empty_phase() {
        let config = TaxonomyConfig {
            families: vec![FamilyDef { id: "mechanical".into(), label: "Mechanical".into() }],
            phases: vec![
                PhaseDef {
                    id: "drilling".into(),
                    label: "Drilling".into(),
                    baseline: vec![],
                    incident_types: vec![IncidentTypeDef {
                        id: "kick".into(),
                        label: "Kick".into(),
                        family: "control".into(),
                        specific: vec![],
                    }],
                },
                PhaseDef {
                    id: "workover".into(),
                    label: "Workover".into(),
                    baseline: vec![],
                    incident_types: vec![],
                },
            ],
            fields: vec![],
        };
        match TaxonomyTable::from_config(&config) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
