//! Rule tables: taxonomy registry, required-field resolution, field catalog
//!
//! All three are built once from `TaxonomyConfig` and bundled into
//! `IntakeRules`, which sessions share read-only through an `Arc`.

pub mod catalog;
pub mod requirements;
pub mod table;

pub use catalog::FieldCatalog;
pub use requirements::{FieldRequirementSet, RequirementResolver};
pub use table::{IncidentTypeEntry, PhaseEntry, TaxonomyTable};

use crate::config::{ConfigError, TaxonomyConfig};

/// Immutable lookup tables for one deployment.
#[derive(Debug, Clone)]
pub struct IntakeRules {
    pub taxonomy: TaxonomyTable,
    pub requirements: RequirementResolver,
    pub catalog: FieldCatalog,
}

impl IntakeRules {
    pub fn from_config(config: &TaxonomyConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            taxonomy: TaxonomyTable::from_config(config)?,
            requirements: RequirementResolver::from_config(config),
            catalog: FieldCatalog::from_config(config),
        })
    }

    /// Rules from the embedded default table.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_config(&TaxonomyConfig::builtin()?)
    }
}
