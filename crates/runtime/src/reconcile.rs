// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation of desired schedules against registered jobs.
//!
//! Identity is the content hash of the config, so "did this schedule
//! change" never has to be answered: an edited config is a different
//! id, and reconciles as remove-old + add-new. Applying the same
//! desired set twice is a no-op.

use crate::error::RuntimeError;
use crate::scheduler::SchedulerRuntime;
use rota_core::schedule::{ScheduleConfig, SchedulesConfig};
use rota_core::ScheduleId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// The diff between desired configs and observed job ids.
#[derive(Debug, Default, PartialEq)]
pub struct ReconcilePlan {
    pub to_add: Vec<ScheduleConfig>,
    pub to_remove: Vec<ScheduleId>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff `desired` against `observed`. Duplicate configs in the desired
/// list collapse to one job.
pub fn reconcile(desired: &[ScheduleConfig], observed: &BTreeSet<ScheduleId>) -> ReconcilePlan {
    let mut desired_ids = BTreeSet::new();
    let mut to_add = Vec::new();
    for config in desired {
        let id = ScheduleId::of(config);
        if desired_ids.insert(id.clone()) && !observed.contains(&id) {
            to_add.push(config.clone());
        }
    }
    let to_remove = observed
        .iter()
        .filter(|id| !desired_ids.contains(*id))
        .cloned()
        .collect();
    ReconcilePlan { to_add, to_remove }
}

/// Applies desired schedule state to the runtime.
pub struct Reconciler {
    runtime: Arc<SchedulerRuntime>,
    // Serializes read-diff-apply across concurrent config updates.
    gate: Mutex<()>,
}

impl Reconciler {
    pub fn new(runtime: Arc<SchedulerRuntime>) -> Self {
        Self {
            runtime,
            gate: Mutex::new(()),
        }
    }

    pub fn runtime(&self) -> &Arc<SchedulerRuntime> {
        &self.runtime
    }

    /// Reconcile the runtime against the configured document.
    ///
    /// `None` (no `schedules` key configured) substitutes the default
    /// hourly run-everything schedule. `Disabled` removes every job and
    /// stops the runtime. Otherwise the desired list is diffed against
    /// the registered jobs, validated additions are armed, stale jobs
    /// removed, and the runtime started if any jobs remain.
    pub async fn apply(
        &self,
        config: Option<&SchedulesConfig>,
    ) -> Result<ReconcilePlan, RuntimeError> {
        let _guard = self.gate.lock().await;

        let default_list;
        let desired: &[ScheduleConfig] = match config {
            None => {
                info!("no schedules configured, defaulting to all tasks on a 1 hour interval");
                default_list = vec![ScheduleConfig::default_hourly()];
                &default_list
            }
            Some(SchedulesConfig::Disabled) => {
                let observed = self.runtime.job_ids();
                for id in &observed {
                    self.runtime.remove_job(id)?;
                }
                if self.runtime.is_running() {
                    info!("schedules disabled, shutting down scheduler");
                    self.runtime.stop(true).await;
                }
                return Ok(ReconcilePlan {
                    to_add: Vec::new(),
                    to_remove: observed.into_iter().collect(),
                });
            }
            Some(SchedulesConfig::List(list)) => list,
        };

        let observed = self.runtime.job_ids();
        let plan = reconcile(desired, &observed);
        if plan.is_empty() {
            debug!("schedule set unchanged");
        }
        for config in &plan.to_add {
            let trigger = config.validate()?;
            self.runtime.add_job(config, trigger)?;
        }
        for id in &plan.to_remove {
            self.runtime.remove_job(id)?;
        }
        if !self.runtime.is_running() && self.runtime.job_count() > 0 {
            self.runtime.start();
        }
        Ok(plan)
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
