//! Shared helpers for daemon specs.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use rota_core::schedule::{CronFields, IntervalSpec, ScheduleConfig, TaskSelector};
use rota_core::{FakeClock, LifecycleEvent};
use rota_daemon::{startup, Config, Daemon};
use rota_runtime::RecordingEngine;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Fixed starting instant for every spec.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
}

pub fn interval_schedule(task: &str, hours: f64) -> ScheduleConfig {
    ScheduleConfig {
        tasks: TaskSelector::One(task.to_string()),
        interval: Some(IntervalSpec::hours(hours)),
        schedule: None,
    }
}

pub fn cron_schedule(task: &str, fields: serde_json::Value) -> ScheduleConfig {
    ScheduleConfig {
        tasks: TaskSelector::One(task.to_string()),
        interval: None,
        schedule: Some(serde_json::from_value::<CronFields>(fields).unwrap()),
    }
}

/// A daemon assembled in a temp state dir with a fake clock and a
/// recording engine.
pub struct TestDaemon {
    pub dir: TempDir,
    pub config: Config,
    pub daemon: Daemon,
    pub events: mpsc::Sender<LifecycleEvent>,
    pub clock: FakeClock,
    pub engine: RecordingEngine,
}

pub fn test_daemon() -> TestDaemon {
    let dir = tempfile::tempdir().unwrap();
    assemble(dir)
}

impl TestDaemon {
    /// Simulate a restart: a fresh daemon over the same state dir.
    pub fn restart(self) -> TestDaemon {
        let TestDaemon { dir, .. } = self;
        assemble(dir)
    }
}

fn assemble(dir: TempDir) -> TestDaemon {
    // Pin the scheduling timezone so fire-time assertions hold on any host.
    std::env::set_var("ROTA_TZ", "UTC");
    let config = Config::from_state_dir(dir.path().to_path_buf());
    let clock = FakeClock::new(t0());
    let engine = RecordingEngine::new();
    let (daemon, events) = startup(
        &config,
        Arc::new(engine.clone()),
        Arc::new(clock.clone()),
    )
    .unwrap();
    TestDaemon {
        dir,
        config,
        daemon,
        events,
        clock,
        engine,
    }
}

/// Write a schedules document straight to the state dir.
pub fn write_document(state_dir: &Path, json: &str) {
    std::fs::create_dir_all(state_dir).unwrap();
    std::fs::write(state_dir.join("schedules.json"), json).unwrap();
}
