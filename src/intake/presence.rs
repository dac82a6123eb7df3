//! The single "has a value" policy shared by merging and validation.
//!
//! A recorded zero (numeric `0` or the text `"0"`) counts as not provided:
//! in the source datasets a true zero reading cannot be told apart from an
//! unset field. Change the policy here and nowhere else.

use crate::types::{MergedRecord, Scalar};

/// Whether a scalar carries real data.
pub fn is_present(value: &Scalar) -> bool {
    match value {
        Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
        Scalar::Text(s) => {
            let s = s.trim();
            !s.is_empty() && s != "0"
        }
    }
}

/// Whether `field` is present in `record` with real data.
pub fn has_value(record: &MergedRecord, field: &str) -> bool {
    record.value(field).is_some_and(is_present)
}
