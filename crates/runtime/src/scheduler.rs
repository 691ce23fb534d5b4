// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler runtime: owns the job store, fires due jobs, and
//! re-arms their next fire time.
//!
//! A job's `next_run_time` is advanced and persisted *before* its body
//! runs, so a crash mid-run re-fires at most the single coalesced
//! catch-up on restart. Fires run on a bounded worker pool; a running
//! job holds one permit for its full duration.

use crate::bridge::{self, ExecutionEngine, TaskOutcome};
use crate::fire::{self, Misfire};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use rota_core::schedule::{ScheduleConfig, TriggerDescriptor};
use rota_core::{Clock, ScheduleId};
use rota_storage::{JobStore, ScheduledJob, StoreError};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Upper bound on one scheduler sleep; the loop re-scans at least this
/// often even with no armed deadline.
const IDLE_POLL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// How long after its scheduled time a missed fire is still honored.
    pub misfire_grace: ChronoDuration,
    /// Maximum jobs executing concurrently.
    pub max_concurrent_jobs: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            misfire_grace: fire::misfire_grace(),
            max_concurrent_jobs: 4,
        }
    }
}

struct Shared {
    store: Mutex<JobStore>,
    tz: Tz,
    clock: Arc<dyn Clock>,
    engine: Arc<dyn ExecutionEngine>,
    grace: ChronoDuration,
    workers: Arc<Semaphore>,
    wake: Notify,
    stop: AtomicBool,
}

/// The scheduler runtime. Cheap to share behind an `Arc`; `start` and
/// `stop` are idempotent.
pub struct SchedulerRuntime {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulerRuntime {
    pub fn new(
        store: JobStore,
        tz: Tz,
        clock: Arc<dyn Clock>,
        engine: Arc<dyn ExecutionEngine>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Mutex::new(store),
                tz,
                clock,
                engine,
                grace: config.misfire_grace,
                workers: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
                wake: Notify::new(),
                stop: AtomicBool::new(false),
            }),
            task: Mutex::new(None),
        }
    }

    /// Start the fire loop. A no-op when already running.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            debug!("scheduler already running");
            return;
        }
        self.shared.stop.store(false, Ordering::SeqCst);
        info!(
            jobs = self.shared.store.lock().len(),
            tz = %self.shared.tz,
            "starting scheduler"
        );
        let shared = Arc::clone(&self.shared);
        *task = Some(tokio::spawn(run_loop(shared)));
    }

    /// Stop the fire loop. With `wait`, in-flight jobs run to
    /// completion first; without, they are abandoned. A no-op when
    /// already stopped.
    pub async fn stop(&self, wait: bool) {
        let handle = self.task.lock().take();
        let Some(handle) = handle else {
            debug!("scheduler already stopped");
            return;
        };
        self.shared.stop.store(true, Ordering::SeqCst);
        self.shared.wake.notify_one();
        if wait {
            info!("stopping scheduler, waiting for in-flight jobs");
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "scheduler loop ended abnormally");
                }
            }
        } else {
            info!("stopping scheduler, abandoning in-flight jobs");
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Force an immediate rescan of fire times.
    pub fn wake(&self) {
        self.shared.wake.notify_one();
    }

    /// Register a job for a validated config, arming and persisting its
    /// first fire time.
    pub fn add_job(
        &self,
        config: &ScheduleConfig,
        trigger: TriggerDescriptor,
    ) -> Result<ScheduleId, StoreError> {
        let id = ScheduleId::of(config);
        let now = self.shared.clock.now_utc();
        let next_run_time = fire::next_fire(&trigger, now, self.shared.tz);
        if next_run_time.is_none() {
            warn!(job = %id.short(12), "trigger yields no future fire time");
        }
        let job = ScheduledJob {
            id: id.clone(),
            name: config.name(),
            tasks: config.tasks.names(),
            trigger,
            next_run_time,
        };
        {
            let mut store = self.shared.store.lock();
            store.insert(job);
            store.save()?;
        }
        debug!(job = %id.short(12), next = ?next_run_time, "registered scheduled job");
        self.shared.wake.notify_one();
        Ok(id)
    }

    /// Remove a job; returns whether it existed.
    pub fn remove_job(&self, id: &ScheduleId) -> Result<bool, StoreError> {
        let removed = {
            let mut store = self.shared.store.lock();
            let removed = store.remove(id);
            if removed {
                store.save()?;
            }
            removed
        };
        if removed {
            debug!(job = %id.short(12), "removed scheduled job");
            self.shared.wake.notify_one();
        }
        Ok(removed)
    }

    pub fn job_ids(&self) -> BTreeSet<ScheduleId> {
        self.shared.store.lock().ids()
    }

    pub fn job_count(&self) -> usize {
        self.shared.store.lock().len()
    }

    pub fn next_run_time(&self, id: &ScheduleId) -> Option<DateTime<Utc>> {
        self.shared.store.lock().get(id).and_then(|j| j.next_run_time)
    }
}

/// A job whose fire time has arrived, snapshotted out of the store.
struct DueJob {
    id: ScheduleId,
    name: String,
    tasks: Vec<String>,
    scheduled_for: DateTime<Utc>,
}

/// Scan the store at `now`: collect due jobs, drop expired fires,
/// re-arm both, and persist the advanced fire times. Returns the due
/// jobs and the earliest remaining deadline.
fn collect_due(shared: &Shared, now: DateTime<Utc>) -> (Vec<DueJob>, Option<DateTime<Utc>>) {
    let mut due = Vec::new();
    let mut deadline: Option<DateTime<Utc>> = None;
    let mut dirty = false;

    let mut store = shared.store.lock();
    for job in store.jobs_mut() {
        let Some(next) = job.next_run_time else {
            continue;
        };
        match fire::classify_due(next, now, shared.grace) {
            Some(Misfire::Due { scheduled_for }) => {
                due.push(DueJob {
                    id: job.id.clone(),
                    name: job.name.clone(),
                    tasks: job.tasks.clone(),
                    scheduled_for,
                });
                // Re-arm from `now`, not from the missed time: a
                // stretch of missed periods coalesces into this one
                // catch-up fire.
                job.next_run_time = fire::next_fire(&job.trigger, now, shared.tz);
                dirty = true;
            }
            Some(Misfire::Expired { scheduled_for }) => {
                debug!(
                    job = %job.id.short(12),
                    missed = %scheduled_for,
                    "dropping missed fire beyond the grace period"
                );
                job.next_run_time = fire::next_fire(&job.trigger, now, shared.tz);
                dirty = true;
            }
            None => {}
        }
        if let Some(next) = job.next_run_time {
            deadline = Some(deadline.map_or(next, |d| d.min(next)));
        }
    }
    if dirty {
        if let Err(e) = store.save() {
            error!(error = %e, "failed to persist job store after fire scan");
        }
    }
    (due, deadline)
}

async fn run_loop(shared: Arc<Shared>) {
    let mut inflight: JoinSet<()> = JoinSet::new();
    loop {
        if shared.stop.load(Ordering::SeqCst) {
            break;
        }
        let now = shared.clock.now_utc();
        let (due, deadline) = collect_due(&shared, now);
        for job in due {
            info!(
                job = %job.id.short(12),
                name = %job.name,
                scheduled_for = %job.scheduled_for,
                "firing scheduled job"
            );
            let engine = Arc::clone(&shared.engine);
            let workers = Arc::clone(&shared.workers);
            inflight.spawn(async move {
                let Ok(_permit) = workers.acquire_owned().await else {
                    return;
                };
                match bridge::run_job(engine.as_ref(), &job.tasks).await {
                    Ok(outcomes) => {
                        let failed = outcomes
                            .iter()
                            .filter(|o| matches!(o, TaskOutcome::Failed(_)))
                            .count();
                        if failed > 0 {
                            warn!(job = %job.id.short(12), failed, "job finished with task failures");
                        } else {
                            debug!(job = %job.id.short(12), "job finished");
                        }
                    }
                    Err(e) => warn!(job = %job.id.short(12), error = %e, "job submission failed"),
                }
            });
        }
        // Reap finished fires without blocking the scan cadence.
        while inflight.try_join_next().is_some() {}

        let sleep_for = deadline
            .map(|d| (d - shared.clock.now_utc()).to_std().unwrap_or_default())
            .unwrap_or(IDLE_POLL)
            .min(IDLE_POLL);
        tokio::select! {
            _ = shared.wake.notified() => {}
            _ = tokio::time::sleep(sleep_for) => {}
        }
    }
    // Graceful drain; a hard stop aborts the loop task, which drops
    // this set and cancels the in-flight fires with it.
    while inflight.join_next().await.is_some() {}
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
