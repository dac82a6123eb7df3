//! Intake Configuration - rule tables, upload limits and service endpoints
//!
//! The taxonomy (phases, incident types, families, field catalog) is data, not
//! code: the built-in table is an embedded TOML file and a deployment can
//! replace it wholesale through a `[taxonomy]` section.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::{FamilyId, FieldId, IncidentTypeId, PhaseId, SpecialistId};

const BUILTIN_TAXONOMY: &str = include_str!("default_taxonomy.toml");

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an intake deployment.
///
/// Load with `IntakeConfig::load()` which searches:
/// 1. `$INTAKE_CONFIG` env var
/// 2. `./intake_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Local bounds on extraction uploads
    #[serde(default)]
    pub uploads: UploadLimits,

    /// External extraction and agent directory endpoints
    #[serde(default)]
    pub services: ServicesConfig,

    /// Workflow assignment defaults
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Phase / incident type / family / field tables
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
}

impl IntakeConfig {
    /// Load configuration using the standard search order:
    /// 1. `$INTAKE_CONFIG` environment variable
    /// 2. `./intake_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), phases = config.taxonomy.phases.len(), "Loaded intake config from INTAKE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from INTAKE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "INTAKE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(phases = config.taxonomy.phases.len(), "Loaded intake config from ./intake_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./intake_config.toml, using defaults");
                }
            }
        }

        info!("No intake_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Syntax(err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys and catalog gaps are logged as warnings; structural
    /// problems in the rule tables are errors.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(ConfigError::Syntax)?;
        config.validate()?;

        for w in super::validation::validate_catalog_coverage(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Check structural invariants of the rule tables and limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.uploads.max_files == 0 {
            errors.push("uploads.max_files must be at least 1".to_string());
        }
        if self.uploads.max_total_bytes == 0 {
            errors.push("uploads.max_total_bytes must be greater than 0".to_string());
        }
        if matches!(self.services.timeout_secs, Some(0)) {
            errors.push("services.timeout_secs must be greater than 0 when set".to_string());
        }

        self.taxonomy.check(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

// ============================================================================
// Uploads
// ============================================================================

/// Bounds checked locally before any extraction request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLimits {
    #[serde(default = "defaults_max_files")]
    pub max_files: usize,
    #[serde(default = "defaults_max_total_bytes")]
    pub max_total_bytes: u64,
}

const fn defaults_max_files() -> usize {
    defaults::MAX_UPLOAD_FILES
}

const fn defaults_max_total_bytes() -> u64 {
    defaults::MAX_UPLOAD_BYTES
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: defaults::MAX_UPLOAD_FILES,
            max_total_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

// ============================================================================
// Services
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Document extraction endpoint (multipart POST)
    #[serde(default = "defaults_extraction_url")]
    pub extraction_url: String,
    /// Agent directory endpoint (GET)
    #[serde(default = "defaults_directory_url")]
    pub directory_url: String,
    /// Optional HTTP timeout. Unset means wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn defaults_extraction_url() -> String {
    defaults::EXTRACTION_URL.to_string()
}

fn defaults_directory_url() -> String {
    defaults::DIRECTORY_URL.to_string()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            extraction_url: defaults_extraction_url(),
            directory_url: defaults_directory_url(),
            timeout_secs: None,
        }
    }
}

// ============================================================================
// Workflow
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Specialist appointed lead by default when the directory lists it
    #[serde(default = "defaults_lead", skip_serializing_if = "Option::is_none")]
    pub default_lead: Option<SpecialistId>,
}

#[allow(clippy::unnecessary_wraps)]
fn defaults_lead() -> Option<SpecialistId> {
    Some(SpecialistId::from(defaults::DEFAULT_LEAD_ID))
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { default_lead: defaults_lead() }
    }
}

// ============================================================================
// Taxonomy tables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyDef {
    pub id: FamilyId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentTypeDef {
    pub id: IncidentTypeId,
    pub label: String,
    pub family: FamilyId,
    /// At least one of these must carry a value
    #[serde(default)]
    pub specific: Vec<FieldId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDef {
    pub id: PhaseId,
    pub label: String,
    /// All of these must carry a value
    #[serde(default)]
    pub baseline: Vec<FieldId>,
    #[serde(default)]
    pub incident_types: Vec<IncidentTypeDef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub id: FieldId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Raw rule tables as written in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub families: Vec<FamilyDef>,
    pub phases: Vec<PhaseDef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TaxonomyConfig {
    /// The embedded default table.
    pub fn builtin() -> Result<Self, ConfigError> {
        let table: Self = toml::from_str(BUILTIN_TAXONOMY).map_err(ConfigError::Syntax)?;
        let mut errors = Vec::new();
        table.check(&mut errors);
        if errors.is_empty() {
            Ok(table)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check(&self, errors: &mut Vec<String>) {
        if self.phases.is_empty() {
            errors.push("taxonomy.phases must declare at least one phase".to_string());
        }

        let mut family_ids = HashSet::new();
        for family in &self.families {
            if !family_ids.insert(family.id.as_str()) {
                errors.push(format!("taxonomy.families: duplicate family '{}'", family.id));
            }
        }

        let mut phase_ids = HashSet::new();
        let mut type_owner: HashMap<&str, &str> = HashMap::new();
        for phase in &self.phases {
            if !phase_ids.insert(phase.id.as_str()) {
                errors.push(format!("taxonomy.phases: duplicate phase '{}'", phase.id));
            }
            if phase.incident_types.is_empty() {
                errors.push(format!(
                    "taxonomy.phases.{}: phase must declare at least one incident type",
                    phase.id
                ));
            }
            for kind in &phase.incident_types {
                if let Some(owner) = type_owner.insert(kind.id.as_str(), phase.id.as_str()) {
                    errors.push(format!(
                        "taxonomy: incident type '{}' declared in both '{}' and '{}'",
                        kind.id, owner, phase.id
                    ));
                }
                if !family_ids.contains(kind.family.as_str()) {
                    errors.push(format!(
                        "taxonomy.phases.{}.{}: unknown family '{}'",
                        phase.id, kind.id, kind.family
                    ));
                }
            }
        }
    }
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self::builtin().expect("embedded default_taxonomy.toml must parse and validate")
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),
    #[error("Config parse error: {0}")]
    Syntax(toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_taxonomy_is_valid() {
        let table = TaxonomyConfig::builtin().unwrap();
        let ids: Vec<&str> = table.phases.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["drilling", "completion", "workover"]);
        assert!(table.phases.iter().all(|p| !p.incident_types.is_empty()));
    }

    #[test]
    fn empty_document_uses_all_defaults() {
        let config = IntakeConfig::from_toml_str("").unwrap();
        assert_eq!(config.uploads.max_files, 5);
        assert_eq!(config.uploads.max_total_bytes, 10 * 1024 * 1024);
        assert_eq!(config.services.timeout_secs, None);
        assert_eq!(config.taxonomy, TaxonomyConfig::builtin().unwrap());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = IntakeConfig::from_toml_str("[uploads]\nmax_files = 3\n").unwrap();
        assert_eq!(config.uploads.max_files, 3);
        assert_eq!(config.uploads.max_total_bytes, defaults::MAX_UPLOAD_BYTES);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = IntakeConfig::from_toml_str("[uploads]\nmax_files = 0\nmax_total_bytes = 0\n")
            .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn round_trips_through_toml() {
        let config = IntakeConfig::default();
        let text = config.to_toml().unwrap();
        let back = IntakeConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.taxonomy, config.taxonomy);
        assert_eq!(back.workflow, config.workflow);
    }
}
