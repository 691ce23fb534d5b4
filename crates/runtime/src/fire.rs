// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-time computation for validated triggers.
//!
//! Interval triggers fire a fixed duration after the previous fire (or
//! registration). Cron triggers are assembled into a seven-field cron
//! expression and evaluated in the scheduling timezone; the `week`
//! field has no cron slot and is applied as a post-filter on candidate
//! fire times.

use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use rota_core::schedule::{CronField, CronFields, IntervalUnit, TriggerDescriptor};
use std::str::FromStr;
use tracing::{error, warn};

/// How long after its scheduled time a missed fire is still honored.
/// A missed fire inside the window coalesces into one catch-up run;
/// beyond it, the fire is dropped.
pub fn misfire_grace() -> Duration {
    Duration::hours(24)
}

/// Candidate fire times scanned when a `week` post-filter is in play.
/// A minute-resolution schedule gated on a far-away ISO week can need
/// on the order of a year of candidates.
const WEEK_SCAN_LIMIT: usize = 1_000_000;

/// The wall-clock duration of one interval trigger period.
pub fn interval_duration(unit: IntervalUnit, amount: f64) -> Duration {
    Duration::milliseconds((amount * unit.seconds() as f64 * 1000.0) as i64)
}

/// The first fire time strictly after `after`, or `None` when the
/// trigger yields no future fire (e.g. a cron year in the past).
pub fn next_fire(trigger: &TriggerDescriptor, after: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    match trigger {
        TriggerDescriptor::Interval { unit, amount } => {
            Some(after + interval_duration(*unit, *amount))
        }
        TriggerDescriptor::Cron(fields) => {
            let expr = cron_expression(fields);
            let schedule = match Schedule::from_str(&expr) {
                Ok(schedule) => schedule,
                Err(e) => {
                    // Fields are validated before a job is registered,
                    // so the assembled expression should always parse.
                    error!(expr = %expr, error = %e, "assembled cron expression failed to parse");
                    return None;
                }
            };
            let after_tz = after.with_timezone(&tz);
            let mut candidates = schedule.after(&after_tz);
            let found = if fields.week.is_some() {
                let found = candidates
                    .by_ref()
                    .take(WEEK_SCAN_LIMIT)
                    .find(|t| week_matches(&fields.week, t));
                if found.is_none() {
                    warn!(expr = %expr, "no candidate fire time matched the week filter");
                }
                found
            } else {
                candidates.next()
            };
            found.map(|t| t.with_timezone(&Utc))
        }
    }
}

/// Assemble the seven-field cron expression (`sec min hour dom month
/// dow year`) from the sparse config fields.
///
/// An omitted field defaults to its minimum when a more significant
/// field was specified, and to `*` otherwise, so `hour: 3` means 03:00
/// daily rather than every minute of the 3 o'clock hour, and
/// `month: 6` means June 1 at midnight rather than every day of June.
/// `week` and `day_of_week` always default to `*`; `day` defaults to
/// `1` under a set year or month unless another day-group field is
/// given. Significance order, most to least: year, month,
/// day/week/day_of_week, hour, minute.
pub(crate) fn cron_expression(fields: &CronFields) -> String {
    let year_set = fields.year.is_some();
    let month_set = fields.month.is_some();
    let day_set = fields.day.is_some() || fields.week.is_some() || fields.day_of_week.is_some();
    let hour_set = fields.hour.is_some();

    let expr = |field: &Option<CronField>, min_if: bool, min: &str| -> String {
        match field {
            Some(value) => value.as_expr(),
            None if min_if => min.to_string(),
            None => "*".to_string(),
        }
    };

    let minute = expr(
        &fields.minute,
        year_set || month_set || day_set || hour_set,
        "0",
    );
    let hour = expr(&fields.hour, year_set || month_set || day_set, "0");
    let day = expr(&fields.day, (year_set || month_set) && !day_set, "1");
    let month = expr(&fields.month, year_set, "1");
    let day_of_week = fields
        .day_of_week_expr()
        .unwrap_or_else(|| "*".to_string());
    let year = expr(&fields.year, false, "*");

    format!("0 {minute} {hour} {day} {month} {day_of_week} {year}")
}

/// Whether a candidate fire time satisfies the `week` post-filter.
fn week_matches(week: &Option<CronField>, when: &DateTime<Tz>) -> bool {
    match week {
        None => true,
        Some(CronField::Expr(s)) if s == "*" => true,
        // Range-checked at validation time, so a non-numeric value
        // cannot reach here.
        Some(field) => field
            .as_expr()
            .parse::<u32>()
            .map(|w| when.iso_week().week() == w)
            .unwrap_or(true),
    }
}

/// A fire whose scheduled time has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misfire {
    /// Within the grace window: run one catch-up fire now.
    Due { scheduled_for: DateTime<Utc> },
    /// Beyond the grace window: drop the fire.
    Expired { scheduled_for: DateTime<Utc> },
}

/// Classify a job's next fire time against the current instant.
/// `None` means the fire is still in the future.
pub fn classify_due(
    scheduled_for: DateTime<Utc>,
    now: DateTime<Utc>,
    grace: Duration,
) -> Option<Misfire> {
    if scheduled_for > now {
        None
    } else if now - scheduled_for <= grace {
        Some(Misfire::Due { scheduled_for })
    } else {
        Some(Misfire::Expired { scheduled_for })
    }
}

#[cfg(test)]
#[path = "fire_tests.rs"]
mod tests;
