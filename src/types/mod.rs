//! Shared data structures for incident intake
//!
//! - Identifiers: phase, incident type, family, field and specialist keys
//! - Field values: scalars with provenance, the merged record
//! - Workflow: specialists and the classified incident output

mod ids;
mod field;
mod workflow;

pub use ids::*;
pub use field::*;
pub use workflow::*;
