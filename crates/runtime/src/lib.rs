// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rota-runtime: the scheduler runtime and reconciler.
//!
//! Computes fire times for validated triggers, runs the fire loop
//! against a persistent job store, bridges into the task execution
//! engine, and reconciles desired schedule configs onto the runtime.

pub mod bridge;
pub mod error;
pub mod fire;
pub mod reconcile;
pub mod scheduler;
pub mod timezone;

pub use bridge::{BridgeError, CompletionHandle, ExecutionEngine, NullEngine, TaskOutcome};
pub use error::RuntimeError;
pub use reconcile::{reconcile, ReconcilePlan, Reconciler};
pub use scheduler::{RuntimeConfig, SchedulerRuntime};

#[cfg(any(test, feature = "test-support"))]
pub use bridge::RecordingEngine;
