// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema validation errors for schedule configurations.

use thiserror::Error;

/// A malformed schedule configuration.
///
/// Every variant names the offending key so callers can surface
/// actionable feedback for user-authored configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("either `interval` or `schedule` must be defined")]
    TriggerRequired,

    #[error("`interval` and `schedule` are mutually exclusive; define only one")]
    TriggerConflict,

    #[error("interval must be specified as exactly one of minutes, hours, days, weeks")]
    IntervalUnit,

    #[error("interval `{unit}` must be a positive number (got {amount})")]
    IntervalAmount { unit: &'static str, amount: f64 },

    #[error("invalid value for `{key}`: {reason}")]
    InvalidCronField { key: &'static str, reason: String },

    #[error("tasks must name at least one task")]
    EmptyTasks,
}
