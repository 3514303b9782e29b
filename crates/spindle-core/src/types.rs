// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Spindle Authors

//! Identifier newtypes shared across the control plane.
//!
//! Cluster object names are case-preserving but compare, order and hash
//! case-insensitively: `node1` and `NODE1` refer to the same object while
//! display output keeps the form the operator originally wrote.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a cluster object name.
pub const NAME_MAX_LENGTH: usize = 48;

/// Error returned when an identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid name `{name}`: {reason}")]
pub struct InvalidNameError {
    /// The rejected input.
    pub name: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

fn check_name(name: &str) -> Result<(), InvalidNameError> {
    let fail = |reason| {
        Err(InvalidNameError {
            name: name.to_owned(),
            reason,
        })
    };
    let mut chars = name.chars();
    match chars.next() {
        None => return fail("name is empty"),
        Some(first) if !first.is_ascii_alphabetic() => {
            return fail("name must start with a letter")
        }
        Some(_) => {}
    }
    if name.len() > NAME_MAX_LENGTH {
        return fail("name exceeds the maximum length");
    }
    if !chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_')) {
        return fail("name contains characters outside [a-zA-Z0-9._-]");
    }
    Ok(())
}

macro_rules! name_type {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name {
            display: String,
            upper: String,
        }

        impl $name {
            /// Validates and wraps a raw name.
            pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
                let display = name.into();
                check_name(&display)?;
                let upper = display.to_ascii_uppercase();
                Ok(Self { display, upper })
            }

            /// The name as originally written.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.display
            }

            /// Canonical uppercase form; the basis of equality and ordering.
            #[must_use]
            pub fn as_upper(&self) -> &str {
                &self.upper
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.upper == other.upper
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.upper.cmp(&other.upper)
            }
        }

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.upper.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.display)
            }
        }

        impl FromStr for $name {
            type Err = InvalidNameError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidNameError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.display
            }
        }
    };
}

name_type!(
    /// Name of a cluster node.
    NodeName
);

name_type!(
    /// Name of a storage pool (the definition and all of its per-node
    /// instances share it).
    StorPoolName
);

name_type!(
    /// Name of a resource definition.
    ResourceName
);

/// Volume slot within a resource definition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct VolumeNumber(pub u32);

impl fmt::Display for VolumeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VolumeNumber {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_accepts_typical_names() {
        for name in ["node1", "stlt.a1.b2", "pool-ssd_0", "N"] {
            assert!(NodeName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(NodeName::new("").is_err());
        assert!(NodeName::new("1node").is_err());
        assert!(NodeName::new("-node").is_err());
        assert!(NodeName::new("node 1").is_err());
        assert!(NodeName::new("node/1").is_err());
        assert!(NodeName::new("x".repeat(NAME_MAX_LENGTH + 1)).is_err());
        assert!(NodeName::new("x".repeat(NAME_MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_case_insensitive_identity() {
        let lower = ResourceName::new("backups").unwrap();
        let upper = ResourceName::new("BACKUPS").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.cmp(&upper), std::cmp::Ordering::Equal);

        let mut set = HashSet::new();
        set.insert(lower);
        assert!(set.contains(&upper));
    }

    #[test]
    fn test_display_preserves_original_case() {
        let name = StorPoolName::new("FastPool").unwrap();
        assert_eq!(name.to_string(), "FastPool");
        assert_eq!(name.as_upper(), "FASTPOOL");
    }

    #[test]
    fn test_serde_revalidates() {
        let name: NodeName = serde_json::from_str("\"node1\"").unwrap();
        assert_eq!(name.as_str(), "node1");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"node1\"");

        let bad: Result<NodeName, _> = serde_json::from_str("\"not a name\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_volume_number_display() {
        assert_eq!(VolumeNumber(7).to_string(), "7");
    }
}
