//! Incident Intake: classification and validation for well events
//!
//! Engine behind the multi-step event wizard of the drilling analytics
//! dashboard.
//!
//! ## Architecture
//!
//! - **Taxonomy**: phases, incident types and their causal families, required
//!   fields per (phase, type), field labels. Data-driven, loaded once.
//! - **Intake**: merges extracted and manual data, validates completeness,
//!   sequences the wizard steps and assembles the classified incident.
//! - **Services**: extraction and agent directory seams with HTTP clients.

pub mod config;
pub mod types;
pub mod taxonomy;
pub mod intake;
pub mod services;

// Re-export configuration
pub use config::IntakeConfig;

// Re-export commonly used types
pub use types::{
    ClassifiedIncident, FamilyId, FieldId, FieldValue, IncidentTypeId, MergedRecord, PhaseId,
    Provenance, RawFields, Scalar, Specialist, SpecialistId,
};

// Re-export rule tables
pub use taxonomy::{FieldCatalog, FieldRequirementSet, IntakeRules, RequirementResolver, TaxonomyTable};

// Re-export the engine
pub use intake::{
    DataMerger, Origin, ValidationResult, WizardError, WizardEvent, WizardSession, WizardStep,
    WorkflowSelection,
};

// Re-export service seams
pub use services::{AgentDirectory, ExtractionService, ServiceError, UploadBatch, UploadDocument};
