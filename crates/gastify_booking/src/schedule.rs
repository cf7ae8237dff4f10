// --- File: crates/gastify_booking/src/schedule.rs ---
//! Time window calculator.
//!
//! Pure functions mapping a requested start instant and package code to the
//! business-hours verdict, the operational window (prep + live service +
//! cleanup) and the local calendar-day bounds. Everything timezone-sensitive
//! goes through civil local time; offsets are resolved per calendar day so
//! daylight-saving transitions land on the right side.

use crate::policy::BookingPolicy;
use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("start falls outside business hours (local hour {hour})")]
    OutsideBusinessHours { hour: u32 },
}

/// The full span a booking occupies on the calendar, including setup and
/// teardown. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationalWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Local midnight-to-midnight span expressed as absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Live-service duration for a package code.
///
/// Unknown codes fall back to the default tier instead of erroring; intake
/// is deliberately lenient about package spelling.
pub fn service_duration(policy: &BookingPolicy, package_code: &str) -> Duration {
    policy
        .packages
        .get(&package_code.trim().to_ascii_lowercase())
        .copied()
        .unwrap_or(policy.default_service)
}

/// Reject starts outside `[hours_start, hours_end)` in the policy timezone.
///
/// The interval is half-open: a start exactly at `hours_end` is rejected.
pub fn validate_business_hours(
    policy: &BookingPolicy,
    start: DateTime<Utc>,
) -> Result<(), ScheduleError> {
    let hour = start.with_timezone(&policy.time_zone).hour();
    if hour < policy.hours_start || hour >= policy.hours_end {
        return Err(ScheduleError::OutsideBusinessHours { hour });
    }
    Ok(())
}

/// Operational window for a requested start: prep before, live service plus
/// cleanup after.
pub fn operational_window(
    policy: &BookingPolicy,
    start: DateTime<Utc>,
    package_code: &str,
) -> OperationalWindow {
    let service = service_duration(policy, package_code);
    OperationalWindow {
        start: start - policy.prep,
        end: start + service + policy.cleanup,
    }
}

/// Bounds of the local calendar day containing `start`.
pub fn calendar_day_bounds(policy: &BookingPolicy, start: DateTime<Utc>) -> DayBounds {
    let local_date = start.with_timezone(&policy.time_zone).date_naive();
    day_bounds_for_date(policy, local_date)
}

/// Bounds of the given local calendar date.
pub fn day_bounds_for_date(policy: &BookingPolicy, date: NaiveDate) -> DayBounds {
    DayBounds {
        start: local_midnight(policy.time_zone, date),
        end: local_midnight(policy.time_zone, date + Duration::days(1)),
    }
}

/// Resolve a local wall-clock time to an absolute instant.
///
/// Ambiguous times (repeated hour at the autumn transition) take the first
/// occurrence; skipped times (spring transition) resume one hour later.
pub(crate) fn local_datetime(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let resolved = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => tz.from_utc_datetime(&naive),
        },
    };
    resolved.with_timezone(&Utc)
}

fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    local_datetime(tz, date.and_hms_opt(0, 0, 0).unwrap())
}
