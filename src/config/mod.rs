//! Intake Configuration Module
//!
//! Provides the deployment configuration loaded from TOML: the phase /
//! incident-type / family rule tables, the field catalog, upload limits and
//! service endpoints.
//!
//! ## Loading Order
//!
//! 1. `INTAKE_CONFIG` environment variable (path to TOML file)
//! 2. `intake_config.toml` in the current working directory
//! 3. Built-in defaults (embedded `default_taxonomy.toml`)
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(IntakeConfig::load());
//! let limits = config::get().uploads;
//! ```

mod intake_config;
pub mod defaults;
pub mod validation;

pub use intake_config::*;

use std::sync::OnceLock;

/// Global intake configuration, initialized once at startup.
static INTAKE_CONFIG: OnceLock<IntakeConfig> = OnceLock::new();

/// Initialize the global intake configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: IntakeConfig) {
    if INTAKE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global intake configuration.
///
/// Panics if `init()` has not been called. A missing config is a startup
/// bug, not a recoverable condition.
pub fn get() -> &'static IntakeConfig {
    INTAKE_CONFIG
        .get()
        .expect("config::get() called before config::init(): this is a startup bug")
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    INTAKE_CONFIG.get().is_some()
}
