// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: startup, the event loop, shutdown.
//!
//! Startup is fail-fast: an unopenable job store aborts the daemon
//! rather than running without persistence. After that the daemon is a
//! loop over [`LifecycleEvent`]s: configuration changes re-reconcile,
//! a shutdown request drains in-flight jobs, and a final shutdown
//! abandons them.

use rota_core::{Clock, LifecycleEvent};
use rota_runtime::{
    timezone, ExecutionEngine, Reconciler, RuntimeConfig, RuntimeError, SchedulerRuntime,
};
use rota_storage::{ConfigStore, JobStore, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::schedules::ScheduleService;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/rota)
    pub state_dir: PathBuf,
    /// Path to the scheduled-job store
    pub jobs_path: PathBuf,
    /// Path to the schedules document
    pub schedules_path: PathBuf,
    /// Path to the daemon log file
    pub log_path: PathBuf,
}

impl Config {
    /// Load configuration for the user-level daemon.
    ///
    /// Uses fixed paths under `~/.local/state/rota/` (or
    /// `$XDG_STATE_HOME/rota/`).
    pub fn load() -> Result<Self, LifecycleError> {
        Ok(Self::from_state_dir(state_dir()?))
    }

    pub fn from_state_dir(state_dir: PathBuf) -> Self {
        Self {
            jobs_path: state_dir.join("jobs.json"),
            schedules_path: state_dir.join("schedules.json"),
            log_path: state_dir.join("rotad.log"),
            state_dir,
        }
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where the daemon is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopped,
}

/// The daemon: owns the reconciler, the schedule service, and the
/// lifecycle event loop.
pub struct Daemon {
    service: Arc<ScheduleService>,
    reconciler: Arc<Reconciler>,
    events: mpsc::Receiver<LifecycleEvent>,
    phase: Phase,
}

/// Start the daemon: open the stores, resolve the scheduling timezone,
/// and assemble the runtime. Returns the daemon plus the sender half of
/// its lifecycle bus (for signal handlers and other producers).
pub fn startup(
    config: &Config,
    engine: Arc<dyn ExecutionEngine>,
    clock: Arc<dyn Clock>,
) -> Result<(Daemon, mpsc::Sender<LifecycleEvent>), LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Fail-fast: the scheduler must not run without persistence.
    let store = JobStore::open(&config.jobs_path)?;
    let tz = timezone::resolve();
    info!(
        jobs = store.len(),
        tz = %tz,
        state_dir = %config.state_dir.display(),
        "daemon starting"
    );

    let runtime = Arc::new(SchedulerRuntime::new(
        store,
        tz,
        clock,
        engine,
        RuntimeConfig::default(),
    ));
    let reconciler = Arc::new(Reconciler::new(runtime));

    let (tx, rx) = mpsc::channel(16);
    let service = Arc::new(ScheduleService::open(
        ConfigStore::new(&config.schedules_path),
        Arc::clone(&reconciler),
        tx.clone(),
    )?);

    Ok((
        Daemon {
            service,
            reconciler,
            events: rx,
            phase: Phase::Idle,
        },
        tx,
    ))
}

impl Daemon {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn service(&self) -> &Arc<ScheduleService> {
        &self.service
    }

    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    /// Run the lifecycle loop until shutdown.
    pub async fn run(&mut self) -> Result<(), LifecycleError> {
        self.apply_config().await?;
        self.phase = Phase::Running;
        info!("daemon ready");

        while let Some(event) = self.events.recv().await {
            match event {
                LifecycleEvent::DaemonStarted | LifecycleEvent::ConfigUpdated => {
                    // A bad config update keeps the previous schedules
                    // running rather than killing the daemon.
                    if let Err(e) = self.apply_config().await {
                        error!(error = %e, "failed to apply updated schedules");
                    }
                }
                LifecycleEvent::ShutdownRequested => {
                    self.shutdown(true).await;
                    break;
                }
                LifecycleEvent::ShutdownFinal => {
                    self.shutdown(false).await;
                    break;
                }
            }
        }
        info!("daemon stopped");
        Ok(())
    }

    /// Reconcile the current schedules document onto the runtime.
    pub async fn apply_config(&mut self) -> Result<(), LifecycleError> {
        let doc = self.service.current().await;
        let plan = self.reconciler.apply(doc.as_ref()).await?;
        if !plan.is_empty() {
            info!(
                added = plan.to_add.len(),
                removed = plan.to_remove.len(),
                "reconciled schedules"
            );
        }
        Ok(())
    }

    /// Stop the scheduler. A graceful shutdown drains in-flight jobs
    /// but can be preempted by a final-shutdown event.
    async fn shutdown(&mut self, wait: bool) {
        let runtime = Arc::clone(self.reconciler.runtime());
        if wait {
            info!("shutdown requested, waiting for in-flight jobs");
            let graceful = runtime.stop(true);
            tokio::pin!(graceful);
            loop {
                tokio::select! {
                    _ = &mut graceful => break,
                    event = self.events.recv() => match event {
                        Some(LifecycleEvent::ShutdownFinal) | None => {
                            info!("final shutdown, abandoning in-flight jobs");
                            break;
                        }
                        _ => {}
                    },
                }
            }
        } else {
            info!("final shutdown, abandoning in-flight jobs");
            runtime.stop(false).await;
        }
        self.phase = Phase::Stopped;
    }
}

/// Get the state directory for rota
fn state_dir() -> Result<PathBuf, LifecycleError> {
    // ROTA_STATE_DIR takes priority (used by tests for isolation)
    if let Ok(dir) = std::env::var("ROTA_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }

    // Fall back to XDG_STATE_HOME/rota or ~/.local/state/rota
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("rota"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/rota"))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
