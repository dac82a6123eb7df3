//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Config loading
// ============================================================================

/// Environment variable naming an intake config file.
pub const CONFIG_ENV_VAR: &str = "INTAKE_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "intake_config.toml";

// ============================================================================
// Extraction uploads
// ============================================================================

/// Maximum number of documents in one extraction request.
pub const MAX_UPLOAD_FILES: usize = 5;

/// Maximum combined size of one extraction request (bytes). 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

// ============================================================================
// External services
// ============================================================================

/// Document extraction endpoint.
pub const EXTRACTION_URL: &str = "http://localhost:8000/api/events/extract";

/// Agent directory endpoint.
pub const DIRECTORY_URL: &str = "http://localhost:8000/api/agents";

// ============================================================================
// Workflow
// ============================================================================

/// Specialist conventionally appointed lead when the directory lists it.
pub const DEFAULT_LEAD_ID: &str = "drilling_engineer";
