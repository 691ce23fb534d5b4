// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule configuration and trigger model.
//!
//! A [`ScheduleConfig`] is one desired recurring job: a task selection
//! plus exactly one trigger, either an [`IntervalSpec`] or cron-style
//! [`CronFields`]. `validate()` normalizes a raw config into a
//! [`TriggerDescriptor`] or a [`SchemaError`] naming the offending key.

use crate::error::SchemaError;
use cron::Schedule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The tasks a schedule runs: the wildcard `*`, a single task name, or
/// an ordered list of task names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskSelector {
    One(String),
    Many(Vec<String>),
}

impl TaskSelector {
    /// Selector for every configured task.
    pub fn all() -> Self {
        TaskSelector::One("*".to_string())
    }

    /// Task names in configuration order.
    pub fn names(&self) -> Vec<String> {
        match self {
            TaskSelector::One(name) => vec![name.clone()],
            TaskSelector::Many(names) => names.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            TaskSelector::One(name) => name.is_empty(),
            TaskSelector::Many(names) => names.is_empty() || names.iter().any(String::is_empty),
        }
    }
}

impl fmt::Display for TaskSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskSelector::One(name) => write!(f, "{}", name),
            TaskSelector::Many(names) => write!(f, "{}", names.join(",")),
        }
    }
}

/// Interval trigger units, from most to least fine-grained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl IntervalUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
            IntervalUnit::Days => "days",
            IntervalUnit::Weeks => "weeks",
        }
    }

    /// Seconds in one unit.
    pub fn seconds(&self) -> u64 {
        match self {
            IntervalUnit::Minutes => 60,
            IntervalUnit::Hours => 60 * 60,
            IntervalUnit::Days => 24 * 60 * 60,
            IntervalUnit::Weeks => 7 * 24 * 60 * 60,
        }
    }
}

impl fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw interval trigger: exactly one unit must be set to a positive number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<f64>,
}

impl IntervalSpec {
    /// An interval of `n` hours.
    pub fn hours(n: f64) -> Self {
        Self {
            hours: Some(n),
            ..Self::default()
        }
    }

    fn unit(&self) -> Result<(IntervalUnit, f64), SchemaError> {
        let set: Vec<(IntervalUnit, f64)> = [
            (IntervalUnit::Minutes, self.minutes),
            (IntervalUnit::Hours, self.hours),
            (IntervalUnit::Days, self.days),
            (IntervalUnit::Weeks, self.weeks),
        ]
        .into_iter()
        .filter_map(|(unit, amount)| amount.map(|a| (unit, a)))
        .collect();

        match set.as_slice() {
            [(unit, amount)] => {
                if *amount > 0.0 && amount.is_finite() {
                    Ok((*unit, *amount))
                } else {
                    Err(SchemaError::IntervalAmount {
                        unit: unit.as_str(),
                        amount: *amount,
                    })
                }
            }
            _ => Err(SchemaError::IntervalUnit),
        }
    }
}

/// One cron-style field value: an integer or a cron expression string
/// (`*`, `*/n`, ranges, lists).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CronField {
    Int(i64),
    Expr(String),
}

impl CronField {
    /// The field rendered into cron expression syntax.
    pub fn as_expr(&self) -> String {
        match self {
            CronField::Int(n) => n.to_string(),
            CronField::Expr(s) => s.clone(),
        }
    }
}

/// Cron-style calendar trigger fields. Any subset may be present;
/// omitted fields take defaults when the expression is assembled
/// (see `rota-runtime`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CronFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<CronField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<CronField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<CronField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<CronField>,
    /// Day of week: an integer 0 (Monday) through 6 (Sunday), or day
    /// names in cron syntax (`mon`, `tue-fri`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<CronField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<CronField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<CronField>,
}

impl CronFields {
    /// Validate every provided field, naming the first offender.
    ///
    /// Each field is checked by substituting it into a probe expression
    /// at its own position, so an out-of-range or malformed value is
    /// reported against its key rather than as a generic parse failure.
    fn validate(&self) -> Result<(), SchemaError> {
        let positional: [(&'static str, &Option<CronField>, usize); 5] = [
            ("minute", &self.minute, 1),
            ("hour", &self.hour, 2),
            ("day", &self.day, 3),
            ("month", &self.month, 4),
            ("year", &self.year, 6),
        ];
        for (key, field, position) in positional {
            if let Some(field) = field {
                probe_cron_field(key, &field.as_expr(), position)?;
            }
        }
        if let Some(day_of_week) = &self.day_of_week {
            validate_day_of_week_field(day_of_week)?;
        }
        if let Some(week) = &self.week {
            validate_week_field(week)?;
        }
        Ok(())
    }

    /// The `day_of_week` field rendered into cron syntax. Integers
    /// count from 0 = Monday and are rendered as day names, since the
    /// cron syntax numbers days from Sunday; strings pass through
    /// unchanged.
    pub fn day_of_week_expr(&self) -> Option<String> {
        self.day_of_week.as_ref().map(day_of_week_expr)
    }
}

/// Day names indexed by the configuration numbering (0 = Monday).
const DAY_OF_WEEK_NAMES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

fn day_of_week_expr(field: &CronField) -> String {
    match field {
        CronField::Int(n) if (0..=6).contains(n) => DAY_OF_WEEK_NAMES[*n as usize].to_string(),
        other => other.as_expr(),
    }
}

/// Integer `day_of_week` values are range-checked against the 0-6
/// Monday-based numbering; strings are probed as cron syntax.
fn validate_day_of_week_field(field: &CronField) -> Result<(), SchemaError> {
    if let CronField::Int(n) = field {
        if !(0..=6).contains(n) {
            return Err(SchemaError::InvalidCronField {
                key: "day_of_week",
                reason: format!(
                    "expected a day number (0 = Monday through 6 = Sunday) or day names, got `{n}`"
                ),
            });
        }
    }
    probe_cron_field("day_of_week", &day_of_week_expr(field), 5)
}

/// Check one field value by building a 7-field expression with the
/// value in its slot and wildcards everywhere else.
fn probe_cron_field(key: &'static str, value: &str, position: usize) -> Result<(), SchemaError> {
    let mut slots = ["0", "*", "*", "*", "*", "*", "*"];
    slots[position] = value;
    let expr = slots.join(" ");
    Schedule::from_str(&expr)
        .map(|_| ())
        .map_err(|e| SchemaError::InvalidCronField {
            key,
            reason: e.to_string(),
        })
}

/// The `week` field is an ISO week number or `*`; the cron syntax has
/// no week-of-year slot, so it is range-checked here and applied as a
/// post-filter on candidate fire times.
fn validate_week_field(field: &CronField) -> Result<(), SchemaError> {
    let in_range = |n: i64| (1..=53).contains(&n);
    let ok = match field {
        CronField::Int(n) => in_range(*n),
        CronField::Expr(s) => s == "*" || s.parse::<i64>().map(in_range).unwrap_or(false),
    };
    if ok {
        Ok(())
    } else {
        Err(SchemaError::InvalidCronField {
            key: "week",
            reason: format!(
                "expected an ISO week number (1-53) or `*`, got `{}`",
                field.as_expr()
            ),
        })
    }
}

/// Canonical trigger descriptor produced by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum TriggerDescriptor {
    Interval { unit: IntervalUnit, amount: f64 },
    Cron(CronFields),
}

/// One desired recurring job as declared by the user.
///
/// Exactly one of `interval`/`schedule` must be present; unknown keys
/// are rejected at deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    pub tasks: TaskSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<IntervalSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<CronFields>,
}

impl ScheduleConfig {
    /// The default schedule substituted when no `schedules` key is
    /// configured: run everything hourly.
    pub fn default_hourly() -> Self {
        Self {
            tasks: TaskSelector::all(),
            interval: Some(IntervalSpec::hours(1.0)),
            schedule: None,
        }
    }

    /// Human-readable job name: comma-joined task names.
    pub fn name(&self) -> String {
        self.tasks.to_string()
    }

    /// Validate the config and normalize its trigger.
    pub fn validate(&self) -> Result<TriggerDescriptor, SchemaError> {
        if self.tasks.is_empty() {
            return Err(SchemaError::EmptyTasks);
        }
        match (&self.interval, &self.schedule) {
            (Some(_), Some(_)) => Err(SchemaError::TriggerConflict),
            (None, None) => Err(SchemaError::TriggerRequired),
            (Some(interval), None) => {
                let (unit, amount) = interval.unit()?;
                Ok(TriggerDescriptor::Interval { unit, amount })
            }
            (None, Some(fields)) => {
                fields.validate()?;
                Ok(TriggerDescriptor::Cron(fields.clone()))
            }
        }
    }
}

/// The `schedules` configuration document.
///
/// Serialized either as the literal `false` (scheduling disabled) or as
/// an ordered list of schedule configs. An *absent* document is encoded
/// as `None` by callers and defaults to [`ScheduleConfig::default_hourly`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulesConfig {
    Disabled,
    List(Vec<ScheduleConfig>),
}

impl SchedulesConfig {
    /// The desired schedule list, or `None` when disabled.
    pub fn desired(&self) -> Option<&[ScheduleConfig]> {
        match self {
            SchedulesConfig::Disabled => None,
            SchedulesConfig::List(list) => Some(list),
        }
    }
}

impl Serialize for SchedulesConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchedulesConfig::Disabled => serializer.serialize_bool(false),
            SchedulesConfig::List(list) => list.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SchedulesConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Bool(false) => Ok(SchedulesConfig::Disabled),
            serde_json::Value::Bool(true) => Err(D::Error::custom(
                "schedules: true is not valid; use false to disable scheduling",
            )),
            serde_json::Value::Array(_) => {
                let list: Vec<ScheduleConfig> =
                    serde_json::from_value(value).map_err(D::Error::custom)?;
                Ok(SchedulesConfig::List(list))
            }
            other => Err(D::Error::custom(format!(
                "schedules must be a list or false, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
