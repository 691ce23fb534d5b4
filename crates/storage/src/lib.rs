// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rota-storage: durable state for the scheduling daemon.
//!
//! Two small JSON stores, both written atomically (write `.tmp`, fsync,
//! rename) so a crash mid-save never corrupts them: the job store
//! (scheduled-job records, so schedules survive restart) and the
//! schedules-document store (the user's desired configuration).

mod fsio;

pub mod config_store;
pub mod job_store;

pub use config_store::ConfigStore;
pub use fsio::StoreError;
pub use job_store::{JobStore, ScheduledJob};
