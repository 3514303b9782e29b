// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Spindle Authors

//! Flat property containers with validated keys.
//!
//! Nodes and other cluster objects carry free-form `key=value` properties
//! that placement constraints refer to (site, rack, availability zone, ...).
//! The key space is flat: `/` is reserved and rejected, so a constraint can
//! never silently address a key that cannot exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a property key.
pub const KEY_MAX_LENGTH: usize = 256;

/// Error returned for malformed property keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The key failed validation; the value was neither read nor written.
    #[error("invalid property key `{key}`: {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

fn check_key(key: &str) -> Result<(), PropertyError> {
    let fail = |reason| {
        Err(PropertyError::InvalidKey {
            key: key.to_owned(),
            reason,
        })
    };
    if key.is_empty() {
        return fail("key is empty");
    }
    if key.len() > KEY_MAX_LENGTH {
        return fail("key exceeds the maximum length");
    }
    if key.contains('/') {
        return fail("key must not contain '/'");
    }
    Ok(())
}

/// Ordered `key -> value` property bag.
///
/// Every access validates the key first: looking up an invalid key is an
/// error, looking up a valid but absent key is `Ok(None)`. The distinction
/// matters to the selector, which must abort a whole placement run on the
/// first invalid key instead of treating it as "no value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Create an empty property map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<&str>, PropertyError> {
        check_key(key)?;
        Ok(self.entries.get(key).map(String::as_str))
    }

    /// Store `value` under `key`, returning the previous value if any.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, PropertyError> {
        let key = key.into();
        check_key(&key)?;
        Ok(self.entries.insert(key, value.into()))
    }

    /// Remove the entry stored under `key`, returning it if present.
    pub fn remove(&mut self, key: &str) -> Result<Option<String>, PropertyError> {
        check_key(key)?;
        Ok(self.entries.remove(key))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
