//! Stable string identifiers used as keys throughout the rule tables

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Operational phase key (e.g. `drilling`, `completion`, `workover`)
    PhaseId
);

string_id!(
    /// Incident type key, unique across all phases (e.g. `stuck_pipe`)
    IncidentTypeId
);

string_id!(
    /// Causal family key (e.g. `mechanical`, `fluids_pressure`)
    FamilyId
);

string_id!(
    /// Canonical data field key (e.g. `depth_md`, `mud_weight`)
    FieldId
);

string_id!(
    /// Specialist agent key as returned by the agent directory
    SpecialistId
);
