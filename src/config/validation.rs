//! Config validation: unknown-key detection with Levenshtein suggestions
//! and field catalog coverage checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, uncatalogued field).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for IntakeConfig.
///
/// Array-of-table entries share their parent's path (no index), so
/// `[[taxonomy.phases.incident_types]]` keys appear as
/// `taxonomy.phases.incident_types.<key>`.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [uploads]
        "uploads",
        "uploads.max_files",
        "uploads.max_total_bytes",
        // [services]
        "services",
        "services.extraction_url",
        "services.directory_url",
        "services.timeout_secs",
        // [workflow]
        "workflow",
        "workflow.default_lead",
        // [taxonomy]
        "taxonomy",
        "taxonomy.families",
        "taxonomy.families.id",
        "taxonomy.families.label",
        "taxonomy.phases",
        "taxonomy.phases.id",
        "taxonomy.phases.label",
        "taxonomy.phases.baseline",
        "taxonomy.phases.incident_types",
        "taxonomy.phases.incident_types.id",
        "taxonomy.phases.incident_types.label",
        "taxonomy.phases.incident_types.family",
        "taxonomy.phases.incident_types.specific",
        "taxonomy.fields",
        "taxonomy.fields.id",
        "taxonomy.fields.label",
        "taxonomy.fields.unit",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`. Tables nested in arrays are walked under the
/// array's own path, each distinct key reported once.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            } else if let Some(items) = v.as_array() {
                for item in items.iter().filter(|i| i.is_table()) {
                    for nested in walk_toml_keys(item, &path) {
                        if !keys.contains(&nested) {
                            keys.push(nested);
                        }
                    }
                }
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so the suggestion does
/// not depend on set iteration order.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| {
            let suggestion = suggest_correction(&key, &known);
            ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            }
        })
        .collect()
}

// ============================================================================
// Field Catalog Coverage
// ============================================================================

/// Warn about required fields that have no catalog entry.
///
/// The catalog only drives labels and units, so a gap is cosmetic: the field
/// is still validated and shown under its raw id.
pub fn validate_catalog_coverage(config: &super::IntakeConfig) -> Vec<ValidationWarning> {
    let taxonomy = &config.taxonomy;
    let catalogued: HashSet<&str> = taxonomy.fields.iter().map(|f| f.id.as_str()).collect();

    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    let required = taxonomy.phases.iter().flat_map(|p| {
        p.baseline
            .iter()
            .chain(p.incident_types.iter().flat_map(|t| t.specific.iter()))
    });
    for field in required {
        if !catalogued.contains(field.as_str()) && seen.insert(field.as_str()) {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!("Required field '{field}' has no entry in taxonomy.fields"),
                suggestion: None,
            });
        }
    }
    warnings
}
