//! WorkflowAssembler - builds the classified incident handed downstream

use tracing::info;

use super::selection::ConfirmedWorkflow;
use crate::taxonomy::TaxonomyTable;
use crate::types::{ClassifiedIncident, IncidentTypeId, MergedRecord, PhaseId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("incident type '{0}' has no family in the taxonomy")]
    UnknownIncidentType(IncidentTypeId),
}

/// Assemble the terminal record.
///
/// The family is looked up here, from the final incident type, so it can
/// never disagree with what was submitted. A `ConfirmedWorkflow` already
/// guarantees a non-empty selection with a lead.
pub fn assemble(
    taxonomy: &TaxonomyTable,
    phase: &PhaseId,
    incident_type: &IncidentTypeId,
    record: &MergedRecord,
    workflow: ConfirmedWorkflow,
) -> Result<ClassifiedIncident, AssemblyError> {
    let family = taxonomy
        .family_of(incident_type.as_str())
        .cloned()
        .ok_or_else(|| AssemblyError::UnknownIncidentType(incident_type.clone()))?;

    let (members, leader) = workflow.into_parts();

    info!(
        phase = %phase,
        family = %family,
        event_type = %incident_type,
        parameters = record.len(),
        specialists = members.len(),
        leader = %leader,
        "Incident classified"
    );

    Ok(ClassifiedIncident {
        phase: phase.clone(),
        family,
        event_type: incident_type.clone(),
        parameters: record.to_parameters(),
        workflow: members,
        leader,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::WorkflowSelection;
    use crate::taxonomy::IntakeRules;
    use crate::types::{FieldValue, Scalar, Specialist};
    use serde_json::json;

    fn confirmed() -> ConfirmedWorkflow {
        let list = vec![
            Specialist { id: "drilling_engineer".into(), name: "Drilling".into(), role: "lead".into() },
            Specialist { id: "mud_engineer".into(), name: "Mud".into(), role: "fluids".into() },
        ];
        WorkflowSelection::from_directory(&list, None).confirm().unwrap()
    }

    #[test]
    fn family_follows_incident_type() {
        let rules = IntakeRules::builtin().unwrap();
        let mut record = MergedRecord::new();
        record.insert("overpull".into(), FieldValue::manual(Scalar::Number(15.0)));

        let incident = assemble(
            &rules.taxonomy,
            &"drilling".into(),
            &"kick".into(),
            &record,
            confirmed(),
        )
        .unwrap();
        assert_eq!(incident.family.as_str(), "control");

        let json = serde_json::to_value(&incident).unwrap();
        assert_eq!(
            json,
            json!({
                "phase": "drilling",
                "family": "control",
                "event_type": "kick",
                "parameters": {"overpull": 15.0},
                "workflow": ["drilling_engineer", "mud_engineer"],
                "leader": "drilling_engineer"
            })
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let rules = IntakeRules::builtin().unwrap();
        let err = assemble(
            &rules.taxonomy,
            &"drilling".into(),
            &"meteor_strike".into(),
            &MergedRecord::new(),
            confirmed(),
        )
        .unwrap_err();
        assert_eq!(err, AssemblyError::UnknownIncidentType("meteor_strike".into()));
    }
}
