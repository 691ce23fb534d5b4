// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-hash identity for schedule configurations.
//!
//! A [`ScheduleId`] is the hex SHA-256 digest of the canonical
//! (key-sorted) JSON serialization of a [`ScheduleConfig`]. It is the
//! one identity used everywhere: the reconciler correlates desired
//! configs with persisted jobs by it, and the CRUD surface addresses
//! schedules by it. Unchanged content keeps its id across restarts;
//! changed content gets a new id (so edits reconcile as add+remove).

use crate::schedule::ScheduleConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier for a schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleId(pub String);

impl ScheduleId {
    /// Wrap an already-computed id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the identity of a schedule config from its content.
    pub fn of(config: &ScheduleConfig) -> Self {
        // serde_json::Value objects are BTreeMaps (preserve_order is
        // off), so round-tripping through Value yields key-sorted,
        // canonical JSON. Serializing plain config data cannot fail.
        let canonical = serde_json::to_value(config)
            .and_then(|value| serde_json::to_string(&value))
            .unwrap_or_default();
        let digest = Sha256::digest(canonical.as_bytes());
        Self(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a string slice truncated to at most `n` characters.
    pub fn short(&self, n: usize) -> &str {
        if self.0.len() <= n {
            &self.0
        } else {
            &self.0[..n]
        }
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ScheduleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ScheduleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for ScheduleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ScheduleId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for ScheduleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
