//! incident-intake - classify and validate well incidents from the command line
//!
//! # Usage
//!
//! ```bash
//! # Browse the taxonomy
//! incident-intake taxonomy
//!
//! # Required fields for one incident type
//! incident-intake requirements --phase drilling --incident-type stuck_pipe
//!
//! # Merge extraction output with manual values and validate
//! incident-intake validate --phase drilling --incident-type stuck_pipe \
//!     --extracted report.json --manual overpull=25
//!
//! # Drive a full wizard session from a recorded event script
//! incident-intake replay --script session.json
//! ```
//!
//! # Environment Variables
//!
//! - `INTAKE_CONFIG`: Path to the intake TOML config (see `config` module)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use incident_intake::config::{self, IntakeConfig};
use incident_intake::intake::{validate, DataMerger, WizardEvent, WizardSession};
use incident_intake::services::{
    AgentDirectory, ExtractionService, HttpAgentDirectory, HttpExtractionClient, UploadBatch,
    UploadDocument,
};
use incident_intake::types::{FieldId, RawFields};
use incident_intake::IntakeRules;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "incident-intake")]
#[command(about = "Well incident classification and validation")]
#[command(version)]
struct CliArgs {
    /// Intake config file. Load errors are fatal here, unlike the
    /// fallback search used when this is unset.
    #[arg(long, global = true, env = "INTAKE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// List phases, incident types and their families
    Taxonomy,

    /// Show the required fields for a (phase, incident type) pair
    Requirements {
        #[arg(long)]
        phase: String,
        #[arg(long)]
        incident_type: String,
    },

    /// Merge extraction output and manual values, then validate
    Validate {
        #[arg(long)]
        phase: String,
        #[arg(long)]
        incident_type: String,
        /// JSON field maps from the extraction service, applied in order
        #[arg(long, value_name = "FILE")]
        extracted: Vec<PathBuf>,
        /// Manual override as field=value (repeatable)
        #[arg(long, value_name = "FIELD=VALUE")]
        manual: Vec<String>,
    },

    /// Apply a JSON array of wizard events and print the submitted incident
    Replay {
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
    },

    /// Send documents to the extraction service and print the fields
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List specialists from the agent directory
    Agents,
}

// ============================================================================
// Subcommands
// ============================================================================

fn print_taxonomy(rules: &IntakeRules) {
    for phase in rules.taxonomy.phases() {
        println!("{} ({})", phase.label, phase.id);
        for kind in rules.taxonomy.incident_types(phase.id.as_str()) {
            let family = rules
                .taxonomy
                .family_label(kind.family.as_str())
                .unwrap_or(kind.family.as_str());
            println!("  {:<28} {:<32} [{}]", kind.id.as_str(), kind.label, family);
        }
    }
}

fn print_requirements(rules: &IntakeRules, phase: &str, incident_type: &str) -> Result<()> {
    if !rules.taxonomy.belongs_to(incident_type, phase) {
        bail!("incident type '{incident_type}' is not defined for phase '{phase}'");
    }
    let req = rules.requirements.resolve(phase, incident_type);

    println!("Required (all):");
    for f in &req.baseline {
        println!("  {:<28} {}", f.as_str(), rules.catalog.describe(f.as_str()));
    }
    println!("At least one of:");
    for f in &req.specific {
        println!("  {:<28} {}", f.as_str(), rules.catalog.describe(f.as_str()));
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn parse_manual(entry: &str) -> Result<(FieldId, &str)> {
    let Some((field, value)) = entry.split_once('=') else {
        bail!("manual value '{entry}' is not in field=value form");
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("manual value '{entry}' has an empty field name");
    }
    Ok((FieldId::from(field), value))
}

fn run_validate(
    rules: &IntakeRules,
    phase: &str,
    incident_type: &str,
    extracted: &[PathBuf],
    manual: &[String],
) -> Result<()> {
    if !rules.taxonomy.belongs_to(incident_type, phase) {
        bail!("incident type '{incident_type}' is not defined for phase '{phase}'");
    }

    let mut merger = DataMerger::new();
    for path in extracted {
        let fields: RawFields = read_json(path)?;
        let usable = merger.add_extraction(fields);
        info!(file = %path.display(), usable, "Extraction batch merged");
    }
    for entry in manual {
        let (field, value) = parse_manual(entry)?;
        merger.set_manual(field, value);
    }

    let record = merger.record();
    let result = validate(&record, &rules.requirements.resolve(phase, incident_type));
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "record": record,
            "validation": result,
        }))?
    );
    if !result.valid {
        warn!("{}", result);
    }
    Ok(())
}

fn run_replay(rules: Arc<IntakeRules>, config: &IntakeConfig, script: &Path) -> Result<()> {
    let events: Vec<WizardEvent> = read_json(script)?;
    let mut session = WizardSession::from_config(rules, config);

    for (i, event) in events.into_iter().enumerate() {
        match session.apply(event) {
            Ok(step) => info!(event = i, step = %step, "Event applied"),
            Err(e) => warn!(event = i, error = %e, "Event rejected"),
        }
    }

    let Some(incident) = session.submitted() else {
        bail!("script ended in the {} step without a submission", session.step());
    };
    println!("{}", serde_json::to_string_pretty(incident)?);
    Ok(())
}

async fn run_extract(config: &IntakeConfig, files: &[PathBuf]) -> Result<()> {
    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        documents.push(UploadDocument::from_path(path).await?);
    }
    let batch = UploadBatch::new(documents, &config.uploads)?;

    let client = HttpExtractionClient::from_config(&config.services)?;
    let fields = client
        .extract(&batch)
        .await
        .with_context(|| format!("Extraction via {} failed", config.services.extraction_url))?;
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}

async fn run_agents(config: &IntakeConfig) -> Result<()> {
    let directory = HttpAgentDirectory::from_config(&config.services)?;
    let specialists = directory
        .list_specialists()
        .await
        .with_context(|| format!("Agent directory at {} unavailable", config.services.directory_url))?;
    for s in &specialists {
        println!("  {:<24} {:<28} {}", s.id.as_str(), s.name, s.role);
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn init_logging(json: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let intake_config = match &args.config {
        Some(path) => IntakeConfig::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => IntakeConfig::load(),
    };
    config::init(intake_config);
    let config = config::get();

    let rules = Arc::new(
        IntakeRules::from_config(&config.taxonomy).context("Invalid taxonomy tables")?,
    );
    info!(
        phases = rules.taxonomy.phases().len(),
        max_files = config.uploads.max_files,
        "Intake rules loaded"
    );

    match args.command {
        SubCommand::Taxonomy => print_taxonomy(&rules),
        SubCommand::Requirements { phase, incident_type } => {
            print_requirements(&rules, &phase, &incident_type)?;
        }
        SubCommand::Validate { phase, incident_type, extracted, manual } => {
            run_validate(&rules, &phase, &incident_type, &extracted, &manual)?;
        }
        SubCommand::Replay { script } => run_replay(rules, config, &script)?,
        SubCommand::Extract { files } => run_extract(config, &files).await?,
        SubCommand::Agents => run_agents(config).await?,
    }

    Ok(())
}
