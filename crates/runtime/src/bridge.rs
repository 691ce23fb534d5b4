// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridge between the scheduler and the task execution engine.
//!
//! The scheduler never runs tasks itself: it submits them through the
//! [`ExecutionEngine`] trait and then awaits one [`CompletionHandle`]
//! per task. Awaiting completions inside the job body is the
//! backpressure device that keeps a slow engine from piling up
//! concurrent fires of the same schedule.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::info;

/// Priority attached to scheduler-submitted task runs.
pub const CRON_PRIORITY: u8 = 5;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("execution engine rejected submission: {0}")]
    Rejected(String),
}

/// Terminal state of one submitted task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(String),
}

/// Receiver half of one task's completion signal.
#[derive(Debug)]
pub struct CompletionHandle {
    rx: oneshot::Receiver<TaskOutcome>,
}

impl CompletionHandle {
    /// A new handle plus the sender the engine resolves it with.
    pub fn pair() -> (oneshot::Sender<TaskOutcome>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// Wait for the task to finish. A dropped sender counts as failure.
    pub async fn wait(self) -> TaskOutcome {
        self.rx
            .await
            .unwrap_or_else(|_| TaskOutcome::Failed("completion signal dropped".to_string()))
    }
}

/// The task execution engine the scheduler submits into.
#[async_trait]
pub trait ExecutionEngine: Send + Sync + 'static {
    /// Submit `tasks` for execution, returning one completion handle
    /// per task. `cron` marks the submission as scheduler-originated.
    async fn submit(
        &self,
        tasks: &[String],
        priority: u8,
        cron: bool,
    ) -> Result<Vec<CompletionHandle>, BridgeError>;
}

/// Submit a job's tasks and block until every one completes.
pub async fn run_job(
    engine: &dyn ExecutionEngine,
    tasks: &[String],
) -> Result<Vec<TaskOutcome>, BridgeError> {
    let handles = engine.submit(tasks, CRON_PRIORITY, true).await?;
    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.wait().await);
    }
    Ok(outcomes)
}

/// Engine that logs each submission and completes it immediately.
/// Stands in until a real execution engine is wired up.
#[derive(Debug, Default)]
pub struct NullEngine;

#[async_trait]
impl ExecutionEngine for NullEngine {
    async fn submit(
        &self,
        tasks: &[String],
        priority: u8,
        cron: bool,
    ) -> Result<Vec<CompletionHandle>, BridgeError> {
        info!(tasks = ?tasks, priority, cron, "submitting tasks (no-op engine)");
        Ok(tasks
            .iter()
            .map(|_| {
                let (tx, handle) = CompletionHandle::pair();
                let _ = tx.send(TaskOutcome::Completed);
                handle
            })
            .collect())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use recording::RecordingEngine;

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    /// Test engine that records every submission and completes each
    /// task, optionally after a delay to simulate long-running work.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingEngine {
        submissions: Arc<Mutex<Vec<Vec<String>>>>,
        delay: Option<Duration>,
    }

    impl RecordingEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_delay(delay: Duration) -> Self {
            Self {
                submissions: Arc::default(),
                delay: Some(delay),
            }
        }

        /// Every submission seen so far, in order.
        pub fn submissions(&self) -> Vec<Vec<String>> {
            self.submissions.lock().clone()
        }
    }

    #[async_trait]
    impl ExecutionEngine for RecordingEngine {
        async fn submit(
            &self,
            tasks: &[String],
            _priority: u8,
            _cron: bool,
        ) -> Result<Vec<CompletionHandle>, BridgeError> {
            self.submissions.lock().push(tasks.to_vec());
            Ok(tasks
                .iter()
                .map(|_| {
                    let (tx, handle) = CompletionHandle::pair();
                    match self.delay {
                        None => {
                            let _ = tx.send(TaskOutcome::Completed);
                        }
                        Some(delay) => {
                            tokio::spawn(async move {
                                tokio::time::sleep(delay).await;
                                let _ = tx.send(TaskOutcome::Completed);
                            });
                        }
                    }
                    handle
                })
                .collect())
        }
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
