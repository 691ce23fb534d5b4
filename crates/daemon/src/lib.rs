// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rota-daemon: daemon lifecycle and the schedule management API.
//!
//! The `rotad` binary wires a [`lifecycle::Daemon`] to signal handlers
//! and file logging; everything else lives in the library so
//! workspace-level tests can drive a daemon in-process.

pub mod lifecycle;
pub mod schedules;

pub use lifecycle::{startup, Config, Daemon, LifecycleError, Phase};
pub use schedules::{ApiError, ScheduleService, ScheduleUpdate, ScheduleView};
