//! Config Validation Tests
//!
//! Typo detection, structural validation of the rule tables, and file
//! loading. These exercise the config layer independently from the wizard.

use incident_intake::config::validation::{
    known_config_keys, suggest_correction, validate_catalog_coverage, validate_unknown_keys,
};
use incident_intake::config::{ConfigError, IntakeConfig, TaxonomyConfig};
use incident_intake::IntakeRules;
use std::io::Write;

const SMALL_TAXONOMY: &str = r#"
[[taxonomy.families]]
id = "mechanical"
label = "Mechanical"

[[taxonomy.phases]]
id = "drilling"
label = "Drilling"
baseline = ["depth_md"]

[[taxonomy.phases.incident_types]]
id = "stuck_pipe"
label = "Stuck Pipe"
family = "mechanical"
specific = ["overpull", "torque"]

[[taxonomy.fields]]
id = "depth_md"
label = "Measured Depth"
unit = "ft"

[[taxonomy.fields]]
id = "overpull"
label = "Overpull"
unit = "klbs"

[[taxonomy.fields]]
id = "torque"
label = "Torque"
unit = "ft-lbs"
"#;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_uploads_section_warns_with_suggestion() {
    let toml_str = r#"
[uploads]
max_flies = 3
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("max_flies"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("uploads.max_files"));
}

#[test]
fn typo_inside_incident_type_table_is_detected() {
    let toml_str = r#"
[[taxonomy.phases]]
id = "drilling"
label = "Drilling"

[[taxonomy.phases.incident_types]]
id = "kick"
label = "Kick"
familly = "control"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "taxonomy.phases.incident_types.familly");
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("taxonomy.phases.incident_types.family")
    );
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = format!(
        r#"
[uploads]
max_files = 3
max_total_bytes = 5242880

[services]
extraction_url = "http://intake:8000/api/events/extract"
directory_url = "http://intake:8000/api/agents"
timeout_secs = 30

[workflow]
default_lead = "drilling_engineer"
{SMALL_TAXONOMY}"#
    );
    let warnings = validate_unknown_keys(&toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");
}

#[test]
fn unknown_section_warns() {
    let warnings = validate_unknown_keys("[telemetry]\nenabled = true\n");
    assert!(warnings.iter().any(|w| w.field == "telemetry"));
}

#[test]
fn multiple_typos_all_warned() {
    let toml_str = r#"
[uploads]
max_flies = 3

[services]
extraction_ulr = "http://x"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 2);
}

#[test]
fn empty_toml_produces_zero_warnings() {
    assert!(validate_unknown_keys("").is_empty());
}

#[test]
fn known_keys_set_covers_every_section() {
    let keys = known_config_keys();
    for key in [
        "uploads.max_files",
        "services.timeout_secs",
        "workflow.default_lead",
        "taxonomy.phases.baseline",
        "taxonomy.phases.incident_types.specific",
        "taxonomy.fields.unit",
    ] {
        assert!(keys.contains(key), "missing known key {key}");
    }
}

#[test]
fn suggest_correction_returns_none_for_garbage() {
    let keys = known_config_keys();
    assert_eq!(suggest_correction("zzzzzzzzzzzz", &keys), None);
}

// ============================================================================
// Structural Validation
// ============================================================================

#[test]
fn all_defaults_pass_validation() {
    let config = IntakeConfig::default();
    assert!(config.validate().is_ok());
    assert!(validate_catalog_coverage(&config).is_empty());
}

#[test]
fn small_taxonomy_loads_into_rules() {
    let config = IntakeConfig::from_toml_str(SMALL_TAXONOMY).unwrap();
    let rules = IntakeRules::from_config(&config.taxonomy).unwrap();
    assert_eq!(rules.taxonomy.phases().len(), 1);
    let req = rules.requirements.resolve("drilling", "stuck_pipe");
    assert_eq!(req.baseline.len(), 1);
    assert_eq!(req.specific.len(), 2);
    assert_eq!(rules.catalog.describe("overpull"), "Overpull (klbs)");
}

#[test]
fn unknown_family_is_rejected() {
    let toml_str = SMALL_TAXONOMY.replace("family = \"mechanical\"", "family = \"magic\"");
    match IntakeConfig::from_toml_str(&toml_str) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("unknown family 'magic'")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn incident_type_in_two_phases_is_rejected() {
    let toml_str = format!(
        r#"{SMALL_TAXONOMY}
[[taxonomy.phases]]
id = "workover"
label = "Workover"
baseline = ["depth_md"]

[[taxonomy.phases.incident_types]]
id = "stuck_pipe"
label = "Stuck Pipe"
family = "mechanical"
specific = ["overpull"]
"#
    );
    match IntakeConfig::from_toml_str(&toml_str) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("declared in both")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn phase_without_incident_types_is_rejected() {
    let toml_str = r#"
[[taxonomy.families]]
id = "mechanical"
label = "Mechanical"

[[taxonomy.phases]]
id = "drilling"
label = "Drilling"
"#;
    assert!(matches!(
        IntakeConfig::from_toml_str(toml_str),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn zero_timeout_is_rejected() {
    let err = IntakeConfig::from_toml_str("[services]\ntimeout_secs = 0\n").unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
}

#[test]
fn uncatalogued_required_field_warns() {
    let toml_str = SMALL_TAXONOMY.replace("specific = [\"overpull\", \"torque\"]", "specific = [\"overpull\", \"jar_hits\"]");
    let config = IntakeConfig::from_toml_str(&toml_str).unwrap();
    let warnings = validate_catalog_coverage(&config);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].field.contains("jar_hits"));
}

#[test]
fn config_roundtrip_preserves_values() {
    let mut config = IntakeConfig::default();
    config.uploads.max_files = 2;
    config.services.timeout_secs = Some(15);
    let text = config.to_toml().unwrap();
    let back = IntakeConfig::from_toml_str(&text).unwrap();
    assert_eq!(back.uploads.max_files, 2);
    assert_eq!(back.services.timeout_secs, Some(15));
    assert_eq!(back.taxonomy, TaxonomyConfig::default());
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_reads_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[uploads]\nmax_files = 1\n{SMALL_TAXONOMY}").unwrap();

    let config = IntakeConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.uploads.max_files, 1);
    assert_eq!(config.taxonomy.phases.len(), 1);
}

#[test]
fn load_from_file_reports_path_on_syntax_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[uploads\nmax_files = 1").unwrap();

    match IntakeConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse(path, _)) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        IntakeConfig::load_from_file(&missing),
        Err(ConfigError::Io(..))
    ));
}
