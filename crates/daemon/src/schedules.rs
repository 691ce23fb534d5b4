// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule management API: CRUD over the schedules document.
//!
//! Every mutation follows the same shape: compute the new document,
//! persist it, reconcile it onto the runtime, then announce the change
//! on the lifecycle bus. A persist failure rolls the in-memory document
//! back, so the cached state never diverges from disk.
//!
//! Schedules are addressed by their content-hash [`ScheduleId`], the
//! same identity the reconciler uses, so an id handed out by `list`
//! always resolves until the schedule's content changes.

use chrono::{DateTime, Utc};
use rota_core::schedule::{CronFields, IntervalSpec, ScheduleConfig, TaskSelector};
use rota_core::{LifecycleEvent, ScheduleId, SchedulesConfig, SchemaError};
use rota_runtime::{Reconciler, RuntimeError};
use rota_storage::{ConfigStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

/// Schedule management errors, mapped to client-visible failures.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("no schedule with id {0}")]
    NotFound(ScheduleId),

    #[error("an identical schedule already exists with id {0}")]
    Duplicate(ScheduleId),

    #[error("failed to persist schedules: {0}")]
    Persistence(#[from] StoreError),

    #[error("created schedule {0} could not be re-located after persistence")]
    Consistency(ScheduleId),
}

impl From<RuntimeError> for ApiError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::Schema(e) => ApiError::Schema(e),
            RuntimeError::Store(e) => ApiError::Persistence(e),
        }
    }
}

/// One schedule as presented to clients: its config, its content-hash
/// id, and its next fire time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleView {
    pub id: ScheduleId,
    #[serde(flatten)]
    pub config: ScheduleConfig,
    pub next_run_time: Option<DateTime<Utc>>,
}

/// A partial schedule edit. Present keys replace the stored value;
/// absent keys are kept, so switching trigger kind requires a replace
/// (a merge that ends up with both triggers fails validation).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleUpdate {
    #[serde(default)]
    pub tasks: Option<TaskSelector>,
    #[serde(default)]
    pub interval: Option<IntervalSpec>,
    #[serde(default)]
    pub schedule: Option<CronFields>,
}

impl ScheduleUpdate {
    fn apply(&self, base: &ScheduleConfig) -> ScheduleConfig {
        ScheduleConfig {
            tasks: self.tasks.clone().unwrap_or_else(|| base.tasks.clone()),
            interval: self.interval.clone().or_else(|| base.interval.clone()),
            schedule: self.schedule.clone().or_else(|| base.schedule.clone()),
        }
    }
}

/// The schedule management service.
pub struct ScheduleService {
    // Cached schedules document; `None` means never configured.
    // The lock spans the whole persist + reconcile of a mutation.
    state: Mutex<Option<SchedulesConfig>>,
    store: ConfigStore,
    reconciler: Arc<Reconciler>,
    events: mpsc::Sender<LifecycleEvent>,
}

impl ScheduleService {
    /// Open the service, loading any persisted schedules document.
    pub fn open(
        store: ConfigStore,
        reconciler: Arc<Reconciler>,
        events: mpsc::Sender<LifecycleEvent>,
    ) -> Result<Self, StoreError> {
        let state = store.load()?;
        Ok(Self {
            state: Mutex::new(state),
            store,
            reconciler,
            events,
        })
    }

    /// The current schedules document.
    pub async fn current(&self) -> Option<SchedulesConfig> {
        self.state.lock().await.clone()
    }

    /// All effective schedules. With no document configured this is the
    /// default hourly schedule; with scheduling disabled it is empty.
    pub async fn list(&self) -> Vec<ScheduleView> {
        let state = self.state.lock().await;
        effective(&state).iter().map(|c| self.view(c)).collect()
    }

    /// Look up one schedule by id.
    pub async fn get(&self, id: &ScheduleId) -> Result<ScheduleView, ApiError> {
        let state = self.state.lock().await;
        effective(&state)
            .iter()
            .find(|c| ScheduleId::of(c) == *id)
            .map(|c| self.view(c))
            .ok_or_else(|| ApiError::NotFound(id.clone()))
    }

    /// Add a schedule. Creating a schedule while scheduling is disabled
    /// (or unconfigured) re-enables it with just the new schedule.
    pub async fn create(&self, config: ScheduleConfig) -> Result<ScheduleView, ApiError> {
        config.validate()?;
        let id = ScheduleId::of(&config);

        let created = {
            let mut state = self.state.lock().await;
            let mut list = match state.as_ref() {
                Some(SchedulesConfig::List(list)) => list.clone(),
                Some(SchedulesConfig::Disabled) | None => {
                    info!("enabling scheduling for newly created schedule");
                    Vec::new()
                }
            };
            if list.iter().any(|c| ScheduleId::of(c) == id) {
                return Err(ApiError::Duplicate(id));
            }
            list.push(config);

            self.commit(&mut state, SchedulesConfig::List(list)).await?;

            // The created entry must resolve under the id we hand back.
            // Identity is content-derived, so a miss here means the
            // persisted document and the id scheme disagree.
            match state.as_ref() {
                Some(SchedulesConfig::List(list)) => {
                    list.iter().find(|c| ScheduleId::of(c) == id).cloned()
                }
                _ => None,
            }
        };
        self.announce();
        match created {
            Some(config) => Ok(self.view(&config)),
            None => Err(ApiError::Consistency(id)),
        }
    }

    /// Replace a schedule wholesale. The replacement gets a new id
    /// derived from its content.
    pub async fn replace(
        &self,
        id: &ScheduleId,
        config: ScheduleConfig,
    ) -> Result<ScheduleView, ApiError> {
        config.validate()?;
        let new_id = ScheduleId::of(&config);

        {
            let mut state = self.state.lock().await;
            let mut list = configured(&state, id)?;
            let index = position(&list, id)?;
            if new_id != *id && list.iter().any(|c| ScheduleId::of(c) == new_id) {
                return Err(ApiError::Duplicate(new_id));
            }
            list[index] = config.clone();

            self.commit(&mut state, SchedulesConfig::List(list)).await?;
        }
        self.announce();
        Ok(self.view(&config))
    }

    /// Apply a partial edit to a schedule.
    pub async fn update(
        &self,
        id: &ScheduleId,
        update: &ScheduleUpdate,
    ) -> Result<ScheduleView, ApiError> {
        let merged = {
            let state = self.state.lock().await;
            let list = configured(&state, id)?;
            let index = position(&list, id)?;
            update.apply(&list[index])
        };
        self.replace(id, merged).await
    }

    /// Remove a schedule. Removing the last one leaves an empty list,
    /// which is distinct from disabling scheduling.
    pub async fn delete(&self, id: &ScheduleId) -> Result<(), ApiError> {
        {
            let mut state = self.state.lock().await;
            let mut list = configured(&state, id)?;
            let index = position(&list, id)?;
            list.remove(index);

            self.commit(&mut state, SchedulesConfig::List(list)).await?;
        }
        self.announce();
        Ok(())
    }

    /// Persist and reconcile a new document, rolling the cache back if
    /// the persist fails.
    async fn commit(
        &self,
        state: &mut Option<SchedulesConfig>,
        next: SchedulesConfig,
    ) -> Result<(), ApiError> {
        let previous = state.replace(next.clone());
        if let Err(e) = self.store.save(&next) {
            *state = previous;
            return Err(ApiError::Persistence(e));
        }
        self.reconciler.apply(Some(&next)).await?;
        Ok(())
    }

    /// Nudge the lifecycle bus after a committed change. Must run with
    /// the state lock released: the event consumer takes the same lock.
    /// Skipping on a full bus is lossless; a queued event observes the
    /// committed state when it is processed.
    fn announce(&self) {
        if let Err(e) = self.events.try_send(LifecycleEvent::ConfigUpdated) {
            debug!(error = %e, "lifecycle bus full, deferring to a pending event");
        }
    }

    fn view(&self, config: &ScheduleConfig) -> ScheduleView {
        let id = ScheduleId::of(config);
        let next_run_time = self.reconciler.runtime().next_run_time(&id);
        ScheduleView {
            id,
            config: config.clone(),
            next_run_time,
        }
    }
}

/// The effective desired schedules for read operations.
fn effective(state: &Option<SchedulesConfig>) -> Vec<ScheduleConfig> {
    match state {
        None => vec![ScheduleConfig::default_hourly()],
        Some(SchedulesConfig::Disabled) => Vec::new(),
        Some(SchedulesConfig::List(list)) => list.clone(),
    }
}

/// The configured list for mutations; addressing a schedule while none
/// are configured is NotFound.
fn configured(
    state: &Option<SchedulesConfig>,
    id: &ScheduleId,
) -> Result<Vec<ScheduleConfig>, ApiError> {
    match state {
        Some(SchedulesConfig::List(list)) => Ok(list.clone()),
        Some(SchedulesConfig::Disabled) | None => Err(ApiError::NotFound(id.clone())),
    }
}

fn position(list: &[ScheduleConfig], id: &ScheduleId) -> Result<usize, ApiError> {
    list.iter()
        .position(|c| ScheduleId::of(c) == *id)
        .ok_or_else(|| ApiError::NotFound(id.clone()))
}

#[cfg(test)]
#[path = "schedules_tests.rs"]
mod tests;
