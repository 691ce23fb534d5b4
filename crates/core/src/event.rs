// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed lifecycle events.
//!
//! The daemon drives scheduling through an explicit state machine over
//! these events instead of implicit hook registration, so ordering and
//! double-invocation behavior stay auditable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process lifecycle signals consumed by the daemon state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The daemon finished bootstrapping; build the runtime and run the
    /// first reconciliation.
    DaemonStarted,
    /// The schedules configuration changed; re-reconcile.
    ConfigUpdated,
    /// Graceful shutdown: wait for in-flight fires to complete.
    ShutdownRequested,
    /// Final teardown: do not wait for in-flight fires.
    ShutdownFinal,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleEvent::DaemonStarted => "daemon_started",
            LifecycleEvent::ConfigUpdated => "config_updated",
            LifecycleEvent::ShutdownRequested => "shutdown_requested",
            LifecycleEvent::ShutdownFinal => "shutdown_final",
        };
        write!(f, "{}", s)
    }
}
