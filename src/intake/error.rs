//! Wizard errors. None of these is fatal; every one leaves the session usable.

use super::assembler::AssemblyError;
use super::selection::SelectionError;
use super::validation::ValidationResult;
use super::wizard::{StepMove, WizardStep};
use crate::services::{ServiceError, UploadError};
use crate::types::{IncidentTypeId, PhaseId, SpecialistId};

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("cannot {action} from the {step} step")]
    InvalidMove { step: WizardStep, action: StepMove },

    #[error("cannot {action} in the {step} step")]
    WrongStep { action: &'static str, step: WizardStep },

    #[error("select a phase and an incident type first")]
    NotIdentified,

    #[error("select a phase first")]
    PhaseNotSelected,

    #[error("unknown phase '{0}'")]
    UnknownPhase(PhaseId),

    #[error("incident type '{incident_type}' does not belong to phase '{phase}'")]
    UnknownIncidentType { incident_type: IncidentTypeId, phase: PhaseId },

    #[error("incident data incomplete: {0}")]
    Incomplete(ValidationResult),

    #[error("an extraction request is still in flight")]
    ExtractionInFlight,

    #[error("incident data is read-only in the {0} step")]
    RecordFrozen(WizardStep),

    #[error("specialist '{0}' is not in the agent directory")]
    UnknownSpecialist(SpecialistId),

    #[error("select at least one specialist and a lead")]
    WorkflowIncomplete,

    #[error("incident already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("upload rejected: {0}")]
    Upload(#[from] UploadError),

    #[error("service call failed: {0}")]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}
