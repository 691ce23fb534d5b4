// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rota-core: data model for the rota scheduling daemon.
//!
//! Schedule configurations, trigger validation, the content-hash
//! identity scheme, lifecycle events, and the clock abstraction.

pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod schedule;

pub use clock::{Clock, SystemClock};
pub use error::SchemaError;
pub use event::LifecycleEvent;
pub use id::ScheduleId;
pub use schedule::{
    CronField, CronFields, IntervalSpec, IntervalUnit, ScheduleConfig, SchedulesConfig,
    TaskSelector, TriggerDescriptor,
};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
