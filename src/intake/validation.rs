//! ValidationEngine - completeness of a merged record
//!
//! Pure and total. Recomputed on every record change, never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::presence::has_value;
use crate::taxonomy::FieldRequirementSet;
use crate::types::{FieldId, MergedRecord};

/// Completeness of one record against one requirement set.
///
/// The at-least-one rule only counts specific fields that are not also
/// baseline fields. A field listed in both is required through the baseline
/// rule, so it is left out of `missing_specific` and its value does not
/// satisfy the specific rule. When every specific field is also baseline the
/// specific rule is vacuous. Without overlap, `missing_specific` is the full
/// specific list whenever none of it has a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Baseline fields without a value, in requirement order
    pub missing_baseline: Vec<FieldId>,
    /// Every specific field outside the baseline while none has a value, else empty
    pub missing_specific: Vec<FieldId>,
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("complete");
        }
        let join = |fields: &[FieldId]| {
            fields.iter().map(FieldId::as_str).collect::<Vec<_>>().join(", ")
        };
        let mut parts = Vec::new();
        if !self.missing_baseline.is_empty() {
            parts.push(format!("missing required [{}]", join(&self.missing_baseline)));
        }
        if !self.missing_specific.is_empty() {
            parts.push(format!("need at least one of [{}]", join(&self.missing_specific)));
        }
        f.write_str(&parts.join("; "))
    }
}

pub fn validate(record: &MergedRecord, requirements: &FieldRequirementSet) -> ValidationResult {
    let missing_baseline: Vec<FieldId> = requirements
        .baseline
        .iter()
        .filter(|f| !has_value(record, f.as_str()))
        .cloned()
        .collect();

    // A field that is also baseline never satisfies the at-least-one rule
    let candidates: Vec<&FieldId> = requirements
        .specific
        .iter()
        .filter(|f| !requirements.baseline.contains(*f))
        .collect();

    let has_any_specific =
        candidates.is_empty() || candidates.iter().any(|f| has_value(record, f.as_str()));

    let missing_specific = if has_any_specific {
        Vec::new()
    } else {
        candidates.into_iter().cloned().collect()
    };

    ValidationResult {
        valid: missing_baseline.is_empty() && has_any_specific,
        missing_baseline,
        missing_specific,
    }
}
