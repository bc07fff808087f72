// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id!(LeadId);
record_id!(CrewId);
record_id!(CrewMemberId);
record_id!(PropertyId);
record_id!(ImageId);

/// Next id for a collection whose ids are decimal strings. Non-numeric ids
/// are ignored when picking the successor.
pub fn next_numeric_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::{LeadId, next_numeric_id};

    #[test]
    fn next_numeric_id_skips_opaque_ids() {
        assert_eq!(next_numeric_id(["1", "7", "lead-x", "3"]), "8");
        assert_eq!(next_numeric_id(Vec::<&str>::new()), "1");
    }

    #[test]
    fn ids_display_their_raw_value() {
        let id = LeadId::from("42");
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.as_str(), "42");
    }
}
