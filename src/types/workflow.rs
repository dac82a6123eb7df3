//! Specialist agents and the classified incident handed to the orchestrator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{FamilyId, FieldId, IncidentTypeId, PhaseId, Scalar, SpecialistId};

/// Specialist agent as listed by the agent directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialist {
    pub id: SpecialistId,
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Terminal artifact of the intake wizard.
///
/// Field names follow the orchestrator contract (`event_type`, `workflow`,
/// `leader`). Built once at submission, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedIncident {
    pub phase: PhaseId,
    pub family: FamilyId,
    pub event_type: IncidentTypeId,
    pub parameters: BTreeMap<FieldId, Scalar>,
    pub workflow: Vec<SpecialistId>,
    pub leader: SpecialistId,
}
