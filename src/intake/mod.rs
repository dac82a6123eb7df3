//! Incident intake engine
//!
//! ## Flow
//!
//! 1. **Identification**: phase, then incident type (family is derived)
//! 2. **Data capture**: extraction batches and manual edits merge into one
//!    record, re-validated against the (phase, type) requirements
//! 3. **Workflow assignment**: specialists and a lead, then submission builds
//!    the `ClassifiedIncident`
//!
//! ## Pieces
//!
//! - `presence`: the single has-a-value policy
//! - `merger`: extraction/manual precedence
//! - `validation`: baseline + at-least-one-specific completeness
//! - `selection`: specialist set and lead invariants
//! - `assembler`: final record construction
//! - `wizard`: step transitions and the per-incident session

pub mod assembler;
pub mod error;
pub mod merger;
pub mod presence;
pub mod selection;
pub mod validation;
pub mod wizard;

pub use assembler::{assemble, AssemblyError};
pub use error::WizardError;
pub use merger::{merge, DataMerger, Origin};
pub use presence::{has_value, is_present};
pub use selection::{ConfirmedWorkflow, SelectionError, WorkflowSelection};
pub use validation::{validate, ValidationResult};
pub use wizard::{transition, Gate, StepMove, WizardEvent, WizardSession, WizardStep};
