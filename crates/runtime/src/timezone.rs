// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduling timezone resolution.
//!
//! Cron triggers fire in the host's local timezone so that `hour: 3`
//! means 3 AM on the machine's clock. Failure to determine the local
//! zone is never fatal: the scheduler falls back to UTC and logs.

use chrono_tz::Tz;
use tracing::{debug, info, warn};

/// Resolve the scheduling timezone, falling back to UTC.
///
/// `ROTA_TZ` overrides host detection (used by tests for isolation,
/// and by deployments that schedule in a zone other than the host's).
pub fn resolve() -> Tz {
    if let Ok(name) = std::env::var("ROTA_TZ") {
        return resolve_name(&name);
    }
    match iana_time_zone::get_timezone() {
        Ok(name) => resolve_name(&name),
        Err(e) => {
            info!(error = %e, "could not determine local timezone, scheduling in UTC");
            Tz::UTC
        }
    }
}

fn resolve_name(name: &str) -> Tz {
    if name.is_empty() || name.eq_ignore_ascii_case("local") {
        info!("local timezone name unavailable, scheduling in UTC");
        return Tz::UTC;
    }
    match name.parse::<Tz>() {
        Ok(tz) => {
            debug!(zone = %tz, "resolved scheduling timezone");
            tz
        }
        Err(_) => {
            warn!(zone = name, "unrecognized local timezone name, scheduling in UTC");
            Tz::UTC
        }
    }
}

#[cfg(test)]
#[path = "timezone_tests.rs"]
mod tests;
