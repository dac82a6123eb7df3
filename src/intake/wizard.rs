//! WizardStateMachine - the three-step intake flow
//!
//! ```text
//! Identification ──advance──▶ DataCapture ──advance / skip──▶ WorkflowAssignment ──submit──▶ Submitted
//!       ▲                          │  ▲                               │
//!       └──────────back────────────┘  └──────────────back─────────────┘
//! ```
//!
//! `transition` is the only place step changes are decided. `WizardSession`
//! owns the per-incident data, gathers the precondition facts into a `Gate`
//! and applies `WizardEvent`s. Sessions share nothing mutable; the rule
//! tables are shared read-only.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::assembler::assemble;
use super::error::WizardError;
use super::merger::DataMerger;
use super::selection::WorkflowSelection;
use super::validation::{validate, ValidationResult};
use crate::config::{IntakeConfig, UploadLimits, WorkflowConfig};
use crate::services::{AgentDirectory, ExtractionService, UploadBatch, UploadDocument};
use crate::taxonomy::{FieldRequirementSet, IntakeRules};
use crate::types::{
    ClassifiedIncident, FamilyId, FieldId, IncidentTypeId, MergedRecord, PhaseId, RawFields,
    Specialist, SpecialistId,
};

// ============================================================================
// Steps and transitions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Identification,
    DataCapture,
    WorkflowAssignment,
    Submitted,
}

impl WizardStep {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Identification => "identification",
            Self::DataCapture => "data capture",
            Self::WorkflowAssignment => "workflow assignment",
            Self::Submitted => "submitted",
        })
    }
}

/// A requested step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMove {
    Advance,
    SkipData,
    Back,
    Submit,
}

impl fmt::Display for StepMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Advance => "advance",
            Self::SkipData => "skip data",
            Self::Back => "go back",
            Self::Submit => "submit",
        })
    }
}

/// Precondition facts for a step change.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    pub identified: bool,
    pub validation: ValidationResult,
    pub extraction_in_flight: bool,
    pub workflow_confirmed: bool,
}

/// Decide the next step, or reject the move.
pub fn transition(step: WizardStep, mv: StepMove, gate: &Gate) -> Result<WizardStep, WizardError> {
    use StepMove::*;
    use WizardStep::*;

    match (step, mv) {
        (Submitted, _) => Err(WizardError::AlreadySubmitted),

        (Identification, Advance) if gate.identified => Ok(DataCapture),
        (Identification, Advance) => Err(WizardError::NotIdentified),

        (DataCapture, Advance) if gate.extraction_in_flight => Err(WizardError::ExtractionInFlight),
        (DataCapture, Advance) if gate.validation.valid => Ok(WorkflowAssignment),
        (DataCapture, Advance) => Err(WizardError::Incomplete(gate.validation.clone())),
        (DataCapture, SkipData) => Ok(WorkflowAssignment),
        (DataCapture, Back) => Ok(Identification),

        (WorkflowAssignment, Back) => Ok(DataCapture),
        (WorkflowAssignment, Submit) if gate.workflow_confirmed => Ok(Submitted),
        (WorkflowAssignment, Submit) => Err(WizardError::WorkflowIncomplete),

        (step, action) => Err(WizardError::InvalidMove { step, action }),
    }
}

// ============================================================================
// Events
// ============================================================================

/// Everything a user (or the service callbacks) can do to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WizardEvent {
    SelectPhase { phase: PhaseId },
    SelectIncidentType { incident_type: IncidentTypeId },
    Advance,
    Back,
    SkipData,
    ExtractionStarted,
    ExtractionCompleted { fields: RawFields },
    ExtractionFailed { reason: String },
    EditField { field: FieldId, value: String },
    SpecialistsLoaded { specialists: Vec<Specialist> },
    DirectoryFailed { reason: String },
    ToggleSpecialist { specialist: SpecialistId },
    SetLead { specialist: SpecialistId },
    Submit,
}

// ============================================================================
// Session
// ============================================================================

pub struct WizardSession {
    rules: Arc<IntakeRules>,
    limits: UploadLimits,
    default_lead: Option<SpecialistId>,

    step: WizardStep,
    phase: Option<PhaseId>,
    incident_type: Option<IncidentTypeId>,

    merger: DataMerger,
    extraction_in_flight: bool,
    notice: Option<String>,

    specialists: Vec<Specialist>,
    selection: WorkflowSelection,

    submitted: Option<ClassifiedIncident>,
}

impl WizardSession {
    /// New session with default upload limits and lead.
    pub fn new(rules: Arc<IntakeRules>) -> Self {
        Self {
            rules,
            limits: UploadLimits::default(),
            default_lead: WorkflowConfig::default().default_lead,
            step: WizardStep::Identification,
            phase: None,
            incident_type: None,
            merger: DataMerger::new(),
            extraction_in_flight: false,
            notice: None,
            specialists: Vec::new(),
            selection: WorkflowSelection::default(),
            submitted: None,
        }
    }

    pub fn from_config(rules: Arc<IntakeRules>, config: &IntakeConfig) -> Self {
        let mut session = Self::new(rules);
        session.limits = config.uploads;
        session.default_lead.clone_from(&config.workflow.default_lead);
        session
    }

    // ------------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------------

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn phase(&self) -> Option<&PhaseId> {
        self.phase.as_ref()
    }

    pub fn incident_type(&self) -> Option<&IncidentTypeId> {
        self.incident_type.as_ref()
    }

    /// Family of the currently selected type, looked up fresh on every call.
    pub fn family(&self) -> Option<&FamilyId> {
        self.incident_type
            .as_ref()
            .and_then(|t| self.rules.taxonomy.family_of(t.as_str()))
    }

    pub fn rules(&self) -> &IntakeRules {
        &self.rules
    }

    /// Requirements for the current (phase, type), once both are chosen.
    pub fn requirements(&self) -> Option<FieldRequirementSet> {
        match (&self.phase, &self.incident_type) {
            (Some(p), Some(t)) => Some(self.rules.requirements.resolve(p.as_str(), t.as_str())),
            _ => None,
        }
    }

    pub fn record(&self) -> MergedRecord {
        self.merger.record()
    }

    pub fn manual_input(&self, field: &str) -> Option<&str> {
        self.merger.manual_input(field)
    }

    /// Current completeness, recomputed from the record every time.
    pub fn validation(&self) -> Option<ValidationResult> {
        self.requirements().map(|req| validate(&self.merger.record(), &req))
    }

    pub fn extraction_in_flight(&self) -> bool {
        self.extraction_in_flight
    }

    /// Last transient failure notice (extraction or directory).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn specialists(&self) -> &[Specialist] {
        &self.specialists
    }

    pub fn selection(&self) -> &WorkflowSelection {
        &self.selection
    }

    pub fn submitted(&self) -> Option<&ClassifiedIncident> {
        self.submitted.as_ref()
    }

    /// Whether `Advance` would currently succeed.
    pub fn can_advance(&self) -> bool {
        transition(self.step, StepMove::Advance, &self.gate()).is_ok()
    }

    fn gate(&self) -> Gate {
        Gate {
            identified: self.phase.is_some() && self.incident_type.is_some(),
            validation: self.validation().unwrap_or_default(),
            extraction_in_flight: self.extraction_in_flight,
            workflow_confirmed: self.selection.confirm().is_some(),
        }
    }

    // ------------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------------

    /// Apply one event, returning the step afterwards.
    pub fn apply(&mut self, event: WizardEvent) -> Result<WizardStep, WizardError> {
        if self.step.is_terminal() {
            return Err(WizardError::AlreadySubmitted);
        }
        match event {
            WizardEvent::SelectPhase { phase } => self.select_phase(phase)?,
            WizardEvent::SelectIncidentType { incident_type } => {
                self.select_incident_type(incident_type)?;
            }
            WizardEvent::Advance => self.advance()?,
            WizardEvent::Back => self.back()?,
            WizardEvent::SkipData => self.skip_data()?,
            WizardEvent::ExtractionStarted => self.begin_extraction()?,
            WizardEvent::ExtractionCompleted { fields } => {
                self.complete_extraction(fields);
            }
            WizardEvent::ExtractionFailed { reason } => self.fail_extraction(reason),
            WizardEvent::EditField { field, value } => self.edit_field(field, &value)?,
            WizardEvent::SpecialistsLoaded { specialists } => self.specialists_loaded(specialists),
            WizardEvent::DirectoryFailed { reason } => self.directory_failed(reason),
            WizardEvent::ToggleSpecialist { specialist } => {
                self.toggle_specialist(&specialist)?;
            }
            WizardEvent::SetLead { specialist } => self.set_lead(&specialist)?,
            WizardEvent::Submit => {
                self.submit()?;
            }
        }
        Ok(self.step)
    }

    fn move_to(&mut self, mv: StepMove) -> Result<(), WizardError> {
        let from = self.step;
        match transition(from, mv, &self.gate()) {
            Ok(to) => {
                self.step = to;
                info!(from = %from, to = %to, action = %mv, "Wizard step changed");
                Ok(())
            }
            Err(e) => {
                warn!(step = %from, action = %mv, error = %e, "Wizard move rejected");
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Step 1: identification
    // ------------------------------------------------------------------------

    /// Choose the phase. Always clears the incident type.
    pub fn select_phase(&mut self, phase: PhaseId) -> Result<(), WizardError> {
        self.require_step(WizardStep::Identification, "select a phase")?;
        if self.rules.taxonomy.phase(phase.as_str()).is_none() {
            return Err(WizardError::UnknownPhase(phase));
        }
        if let Some(stale) = self.incident_type.take() {
            debug!(incident_type = %stale, "Incident type cleared by phase change");
        }
        info!(phase = %phase, "Phase selected");
        self.phase = Some(phase);
        Ok(())
    }

    pub fn select_incident_type(&mut self, incident_type: IncidentTypeId) -> Result<(), WizardError> {
        self.require_step(WizardStep::Identification, "select an incident type")?;
        let phase = self.phase.clone().ok_or(WizardError::PhaseNotSelected)?;
        if !self.rules.taxonomy.belongs_to(incident_type.as_str(), phase.as_str()) {
            return Err(WizardError::UnknownIncidentType { incident_type, phase });
        }
        info!(
            phase = %phase,
            incident_type = %incident_type,
            family = ?self.rules.taxonomy.family_of(incident_type.as_str()).map(FamilyId::as_str),
            "Incident type selected"
        );
        self.incident_type = Some(incident_type);
        Ok(())
    }

    pub fn advance(&mut self) -> Result<(), WizardError> {
        self.move_to(StepMove::Advance)
    }

    /// Step back one screen. Entered data is kept.
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.move_to(StepMove::Back)
    }

    // ------------------------------------------------------------------------
    // Step 2: data capture
    // ------------------------------------------------------------------------

    /// Operator override: drop all data and continue without validation.
    pub fn skip_data(&mut self) -> Result<(), WizardError> {
        self.move_to(StepMove::SkipData)?;
        if self.extraction_in_flight {
            warn!("Skipping data with an extraction in flight; its result will be discarded");
        }
        self.merger.clear();
        self.extraction_in_flight = false;
        info!("Incident data skipped by operator");
        Ok(())
    }

    /// Check a document set against the upload limits. No state change.
    pub fn prepare_upload(&self, documents: Vec<UploadDocument>) -> Result<UploadBatch, WizardError> {
        UploadBatch::new(documents, &self.limits).map_err(|e| {
            warn!(error = %e, "Upload rejected before sending");
            WizardError::Upload(e)
        })
    }

    pub fn begin_extraction(&mut self) -> Result<(), WizardError> {
        self.require_step(WizardStep::DataCapture, "upload documents")?;
        if self.extraction_in_flight {
            return Err(WizardError::ExtractionInFlight);
        }
        self.extraction_in_flight = true;
        self.notice = None;
        debug!("Extraction request started");
        Ok(())
    }

    /// Merge a completed extraction. Returns the number of usable fields, or
    /// `None` when no request was outstanding and the result was discarded.
    pub fn complete_extraction(&mut self, fields: RawFields) -> Option<usize> {
        if !self.extraction_in_flight {
            warn!(fields = fields.len(), "Discarding extraction result with no request in flight");
            return None;
        }
        self.extraction_in_flight = false;
        let received = fields.len();
        let usable = self.merger.add_extraction(fields);
        let validation = self.validation().unwrap_or_default();
        info!(
            received,
            usable,
            batches = self.merger.batch_count(),
            valid = validation.valid,
            "Extraction merged"
        );
        Some(usable)
    }

    /// Record an extraction failure. The record is left untouched.
    pub fn fail_extraction(&mut self, reason: String) {
        if !self.extraction_in_flight {
            warn!(reason = %reason, "Ignoring extraction failure with no request in flight");
            return;
        }
        self.extraction_in_flight = false;
        warn!(reason = %reason, "Extraction failed; manual entry still available");
        self.notice = Some(reason);
    }

    /// Run one extraction round trip against `service`.
    pub async fn upload<S>(&mut self, service: &S, batch: UploadBatch) -> Result<usize, WizardError>
    where
        S: ExtractionService + ?Sized,
    {
        self.begin_extraction()?;
        match service.extract(&batch).await {
            Ok(fields) => Ok(self.complete_extraction(fields).unwrap_or(0)),
            Err(e) => {
                self.fail_extraction(e.to_string());
                Err(WizardError::Service(e))
            }
        }
    }

    /// Set or clear (blank `value`) a manual override.
    pub fn edit_field(&mut self, field: FieldId, value: &str) -> Result<(), WizardError> {
        if self.step != WizardStep::DataCapture {
            return Err(WizardError::RecordFrozen(self.step));
        }
        debug!(field = %field, cleared = value.trim().is_empty(), "Manual field edit");
        self.merger.set_manual(field, value);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Step 3: workflow assignment
    // ------------------------------------------------------------------------

    /// Install the directory listing and its default selection. Entries
    /// repeating an earlier id are dropped.
    pub fn specialists_loaded(&mut self, mut specialists: Vec<Specialist>) {
        let listed = specialists.len();
        let mut seen = HashSet::with_capacity(listed);
        specialists.retain(|s| seen.insert(s.id.clone()));
        if specialists.len() < listed {
            warn!(
                listed,
                kept = specialists.len(),
                "Agent directory repeated specialist ids; duplicates dropped"
            );
        }
        self.selection = WorkflowSelection::from_directory(&specialists, self.default_lead.as_ref());
        info!(
            count = specialists.len(),
            lead = ?self.selection.lead().map(SpecialistId::as_str),
            "Specialists loaded"
        );
        self.specialists = specialists;
    }

    /// Directory unavailable: no specialists, submission blocked until retried.
    pub fn directory_failed(&mut self, reason: String) {
        warn!(reason = %reason, "Agent directory unavailable");
        self.specialists.clear();
        self.selection.clear();
        self.notice = Some(reason);
    }

    pub async fn load_specialists<D>(&mut self, directory: &D) -> Result<usize, WizardError>
    where
        D: AgentDirectory + ?Sized,
    {
        match directory.list_specialists().await {
            Ok(list) => {
                self.specialists_loaded(list);
                Ok(self.specialists.len())
            }
            Err(e) => {
                self.directory_failed(e.to_string());
                Err(WizardError::Service(e))
            }
        }
    }

    /// Returns whether the specialist is selected afterwards.
    pub fn toggle_specialist(&mut self, id: &SpecialistId) -> Result<bool, WizardError> {
        self.require_step(WizardStep::WorkflowAssignment, "change specialists")?;
        if !self.specialists.iter().any(|s| &s.id == id) {
            return Err(WizardError::UnknownSpecialist(id.clone()));
        }
        let selected = self.selection.toggle(id);
        debug!(
            specialist = %id,
            selected,
            lead = ?self.selection.lead().map(SpecialistId::as_str),
            "Specialist toggled"
        );
        Ok(selected)
    }

    pub fn set_lead(&mut self, id: &SpecialistId) -> Result<(), WizardError> {
        self.require_step(WizardStep::WorkflowAssignment, "appoint a lead")?;
        self.selection.set_lead(id)?;
        info!(lead = %id, "Lead specialist appointed");
        Ok(())
    }

    /// Build the classified incident. The only path that produces one.
    pub fn submit(&mut self) -> Result<&ClassifiedIncident, WizardError> {
        let confirmed = self.selection.confirm();
        self.move_to(StepMove::Submit)?;

        let (Some(phase), Some(kind), Some(workflow)) =
            (self.phase.clone(), self.incident_type.clone(), confirmed)
        else {
            self.step = WizardStep::WorkflowAssignment;
            return Err(WizardError::NotIdentified);
        };

        match assemble(&self.rules.taxonomy, &phase, &kind, &self.merger.record(), workflow) {
            Ok(incident) => Ok(self.submitted.insert(incident)),
            Err(e) => {
                self.step = WizardStep::WorkflowAssignment;
                Err(e.into())
            }
        }
    }

    fn require_step(&self, step: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            return Ok(());
        }
        warn!(current = %self.step, required = %step, action, "Event not allowed in this step");
        if self.step.is_terminal() {
            Err(WizardError::AlreadySubmitted)
        } else {
            Err(WizardError::WrongStep { action, step: self.step })
        }
    }
}
