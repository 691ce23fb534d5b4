// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent store of scheduled-job records.
//!
//! Each record correlates a desired schedule config (by content-hash
//! [`ScheduleId`]) with its live trigger state. Records are never
//! updated in place: a content change produces a different id, so it
//! reconciles as remove + add.

use crate::fsio::{self, StoreError};
use chrono::{DateTime, Utc};
use rota_core::{ScheduleId, TriggerDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A registered scheduled job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: ScheduleId,
    /// Human-readable name: comma-joined task names.
    pub name: String,
    pub tasks: Vec<String>,
    pub trigger: TriggerDescriptor,
    /// Next scheduled fire time; `None` when the trigger yields no
    /// future fire (e.g. a cron year in the past).
    pub next_run_time: Option<DateTime<Utc>>,
}

/// On-disk document shape.
#[derive(Debug, Serialize, Deserialize)]
struct JobStoreFile {
    version: u32,
    saved_at: DateTime<Utc>,
    jobs: Vec<ScheduledJob>,
}

const STORE_VERSION: u32 = 1;

/// The scheduled-job store: in-memory map plus its backing file.
#[derive(Debug)]
pub struct JobStore {
    path: PathBuf,
    jobs: BTreeMap<ScheduleId, ScheduledJob>,
}

impl JobStore {
    /// Open the store, loading any persisted records.
    ///
    /// An unreadable backing directory is an error (the scheduler must
    /// not run un-persisted); a corrupt file is rotated to `.bak` and
    /// the store starts empty.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let jobs = match fsio::load_json::<JobStoreFile>(path)? {
            Some(file) => file.jobs.into_iter().map(|j| (j.id.clone(), j)).collect(),
            None => BTreeMap::new(),
        };
        Ok(Self {
            path: path.to_path_buf(),
            jobs,
        })
    }

    /// Persist the current records atomically.
    pub fn save(&self) -> Result<(), StoreError> {
        let file = JobStoreFile {
            version: STORE_VERSION,
            saved_at: Utc::now(),
            jobs: self.jobs.values().cloned().collect(),
        };
        fsio::save_json(&self.path, &file)
    }

    pub fn insert(&mut self, job: ScheduledJob) {
        self.jobs.insert(job.id.clone(), job);
    }

    /// Remove a record; returns whether it existed.
    pub fn remove(&mut self, id: &ScheduleId) -> bool {
        self.jobs.remove(id).is_some()
    }

    pub fn get(&self, id: &ScheduleId) -> Option<&ScheduledJob> {
        self.jobs.get(id)
    }

    pub fn ids(&self) -> BTreeSet<ScheduleId> {
        self.jobs.keys().cloned().collect()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &ScheduledJob> {
        self.jobs.values()
    }

    pub fn jobs_mut(&mut self) -> impl Iterator<Item = &mut ScheduledJob> {
        self.jobs.values_mut()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
#[path = "job_store_tests.rs"]
mod tests;
