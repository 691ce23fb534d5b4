// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store for the `schedules` configuration document.
//!
//! An absent file means the key was never configured (callers
//! substitute the default hourly schedule); an explicit `false` means
//! scheduling is disabled. Both encodings round-trip through
//! [`SchedulesConfig`].

use crate::fsio::{self, StoreError};
use rota_core::SchedulesConfig;
use std::path::{Path, PathBuf};

/// The schedules-document store.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Load the persisted document. `Ok(None)` when no document exists.
    pub fn load(&self) -> Result<Option<SchedulesConfig>, StoreError> {
        fsio::load_json(&self.path)
    }

    /// Persist the document atomically.
    pub fn save(&self, config: &SchedulesConfig) -> Result<(), StoreError> {
        fsio::save_json(&self.path, config)
    }
}

#[cfg(test)]
#[path = "config_store_tests.rs"]
mod tests;
