// --- File: crates/gastify_booking/src/logic.rs ---
//! Booking admission orchestrator and availability query.
//!
//! One linear sequence per request, shared by every entry point (payment
//! trigger and direct API): validate fields, check business hours, derive
//! day bounds and operational window, consult the idempotency guard, read
//! existing bookings, evaluate capacity, commit exactly once. Local
//! rejections become explicit outcome values; only calendar I/O failures
//! surface as hard errors, and those are never retried here.

use crate::capacity::{self, CapacityError};
use crate::idempotency;
use crate::policy::BookingPolicy;
use crate::schedule::{self, OperationalWindow, ScheduleError};
use chrono::{DateTime, NaiveDate, Utc};
use gastify_common::services::{
    BookingRecord, BoxedError, CalendarService, ExistingBooking, IDEMPOTENCY_TAG_KEY,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

// --- Error Handling ---
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("missing or invalid fields: {0}")]
    MissingFields(String),
    #[error("start falls outside business hours (local hour {hour})")]
    OutsideBusinessHours { hour: u32 },
    #[error("daily booking limit reached ({active} active)")]
    DayCapacityExceeded { active: usize },
    #[error("too many concurrent bookings ({overlapping} overlapping)")]
    OverlapCapacityExceeded { overlapping: usize },
    #[error("calendar read failed: {0}")]
    CalendarReadFailed(String),
    #[error("calendar write failed: {0}")]
    CalendarWriteFailed(String),
}

impl BookingError {
    /// Local, deterministic rejections; retrying these cannot succeed.
    pub fn is_business_rejection(&self) -> bool {
        !matches!(
            self,
            BookingError::CalendarReadFailed(_) | BookingError::CalendarWriteFailed(_)
        )
    }
}

impl From<ScheduleError> for BookingError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::OutsideBusinessHours { hour } => {
                BookingError::OutsideBusinessHours { hour }
            }
        }
    }
}

impl From<CapacityError> for BookingError {
    fn from(err: CapacityError) -> Self {
        match err {
            CapacityError::DayCapacityExceeded { active } => {
                BookingError::DayCapacityExceeded { active }
            }
            CapacityError::OverlapCapacityExceeded { overlapping } => {
                BookingError::OverlapCapacityExceeded { overlapping }
            }
        }
    }
}

// --- Data Structures ---

/// One booking request, however it arrived. Immutable once constructed;
/// the intake steps (webhook mapping, direct API) build it and hand it to
/// `admit_booking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub customer_name: String,
    pub package_code: String,
    pub offering: String,
    pub start_time: DateTime<Utc>,
    pub venue: Option<String>,
    #[serde(default)]
    pub contact_emails: Vec<String>,
    /// Total price in minor units.
    pub total_amount: Option<i64>,
    /// Deposit in minor units; must not exceed the total.
    pub deposit_amount: Option<i64>,
    /// Unique token deduplicating retried triggers. Absent token disables
    /// the idempotency guard.
    pub idempotency_key: Option<String>,
}

impl BookingRequest {
    /// Field-level validation, run before any time or capacity checks.
    pub fn validate(&self) -> Result<(), BookingError> {
        let mut missing = Vec::new();
        if self.customer_name.trim().is_empty() {
            missing.push("customer_name");
        }
        if self.package_code.trim().is_empty() {
            missing.push("package_code");
        }
        if self.offering.trim().is_empty() {
            missing.push("offering");
        }
        if !missing.is_empty() {
            return Err(BookingError::MissingFields(missing.join(", ")));
        }

        if self.total_amount.is_some_and(|v| v < 0) {
            return Err(BookingError::MissingFields(
                "total_amount must not be negative".to_string(),
            ));
        }
        if self.deposit_amount.is_some_and(|v| v < 0) {
            return Err(BookingError::MissingFields(
                "deposit_amount must not be negative".to_string(),
            ));
        }
        if let (Some(deposit), Some(total)) = (self.deposit_amount, self.total_amount) {
            if deposit > total {
                return Err(BookingError::MissingFields(
                    "deposit_amount exceeds total_amount".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Terminal result of a booking admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BookingOutcome {
    /// A new booking was committed to the calendar.
    Booked { event_id: String },
    /// The idempotency token was committed earlier; nothing was created.
    /// A no-op success, not a rejection.
    AlreadyBooked { event_id: String },
}

impl BookingOutcome {
    pub fn event_id(&self) -> &str {
        match self {
            BookingOutcome::Booked { event_id } | BookingOutcome::AlreadyBooked { event_id } => {
                event_id
            }
        }
    }
}

// --- Admission Orchestrator ---

/// Run one booking request through the full admission sequence.
///
/// Capacity enforcement is best-effort: two concurrent requests can both
/// read the same counts and both commit. The calendar is the only point of
/// synchronization and no lock is taken around the read-then-write span.
pub async fn admit_booking(
    calendar: &dyn CalendarService<Error = BoxedError>,
    calendar_id: &str,
    policy: &BookingPolicy,
    request: &BookingRequest,
) -> Result<BookingOutcome, BookingError> {
    request.validate()?;
    schedule::validate_business_hours(policy, request.start_time)?;

    let bounds = schedule::calendar_day_bounds(policy, request.start_time);
    let window = schedule::operational_window(policy, request.start_time, &request.package_code);

    // Replayed trigger: resolve to the earlier commit without re-running
    // capacity checks.
    if let Some(token) = request.idempotency_key.as_deref() {
        let hit = idempotency::lookup(calendar, calendar_id, token, &bounds)
            .await
            .map_err(|e| BookingError::CalendarReadFailed(e.to_string()))?;
        if let Some(event_id) = hit {
            info!(%event_id, token, "duplicate booking trigger, returning existing booking");
            return Ok(BookingOutcome::AlreadyBooked { event_id });
        }
    }

    // One day-scoped read serves both counts; a second window-scoped read
    // is only needed when the operational window spills past the local day
    // boundary (bookings near midnight).
    let day_bookings = calendar
        .list_bookings(calendar_id, bounds.start, bounds.end, None)
        .await
        .map_err(|e| BookingError::CalendarReadFailed(e.to_string()))?;
    let window_bookings = if window.start < bounds.start || window.end > bounds.end {
        calendar
            .list_bookings(calendar_id, window.start, window.end, None)
            .await
            .map_err(|e| BookingError::CalendarReadFailed(e.to_string()))?
    } else {
        day_bookings.clone()
    };

    let day_count = capacity::count_active_on_day(&day_bookings, &bounds);
    let overlap_count = capacity::count_overlapping(&window_bookings, &window);
    if let Err(err) = capacity::evaluate(policy, day_count, overlap_count) {
        warn!(day_count, overlap_count, %err, "booking rejected by capacity rules");
        return Err(err.into());
    }

    let record = build_record(policy, request, &window);
    let created = calendar
        .create_booking(calendar_id, record)
        .await
        .map_err(|e| BookingError::CalendarWriteFailed(e.to_string()))?;

    info!(event_id = %created.event_id, day_count, overlap_count, "booking committed");
    Ok(BookingOutcome::Booked {
        event_id: created.event_id,
    })
}

/// Assemble the record committed to the calendar: a human-readable summary
/// and description, plus machine-readable tags for later lookup and audit.
fn build_record(
    policy: &BookingPolicy,
    request: &BookingRequest,
    window: &OperationalWindow,
) -> BookingRecord {
    let tz = policy.time_zone;
    let service = schedule::service_duration(policy, &request.package_code);
    let local_start = request.start_time.with_timezone(&tz);
    let local_service_end = (request.start_time + service).with_timezone(&tz);

    let summary = format!(
        "Catering: {} ({})",
        request.customer_name, request.package_code
    );

    let mut lines = vec![
        format!("Offering: {}", request.offering),
        format!(
            "Package: {} ({} min service)",
            request.package_code,
            service.num_minutes()
        ),
        format!(
            "Service {} to {} ({})",
            local_start.format("%Y-%m-%d %H:%M"),
            local_service_end.format("%H:%M"),
            tz.name()
        ),
        format!(
            "On-site {} to {}",
            window.start.with_timezone(&tz).format("%H:%M"),
            window.end.with_timezone(&tz).format("%H:%M")
        ),
    ];
    if let Some(venue) = &request.venue {
        lines.push(format!("Venue: {}", venue));
    }
    if !request.contact_emails.is_empty() {
        lines.push(format!("Contact: {}", request.contact_emails.join(", ")));
    }
    if let Some(total) = request.total_amount {
        let mut line = format!("Total: {}", format_minor_units(total));
        if let Some(deposit) = request.deposit_amount {
            line.push_str(&format!(" (deposit {})", format_minor_units(deposit)));
        }
        lines.push(line);
    }
    if let Some(key) = &request.idempotency_key {
        lines.push(format!("Ref: {}", key));
    }

    let mut tags = HashMap::new();
    tags.insert("package".to_string(), request.package_code.clone());
    tags.insert("offering".to_string(), request.offering.clone());
    tags.insert(
        "requested_start".to_string(),
        request.start_time.to_rfc3339(),
    );
    if let Some(total) = request.total_amount {
        tags.insert("total_amount".to_string(), total.to_string());
    }
    if let Some(deposit) = request.deposit_amount {
        tags.insert("deposit_amount".to_string(), deposit.to_string());
    }
    if let Some(key) = &request.idempotency_key {
        tags.insert(IDEMPOTENCY_TAG_KEY.to_string(), key.clone());
    }

    BookingRecord {
        summary,
        description: lines.join("\n"),
        location: request.venue.clone(),
        start: window.start,
        end: window.end,
        time_zone: tz.name().to_string(),
        attendees: request.contact_emails.clone(),
        tags,
    }
}

fn format_minor_units(amount: i64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

// --- Availability Query ---

/// Offerable local start hours for a date and package, given the bookings
/// already fetched for the surrounding range. Pure; `now` is passed in so
/// tests stay deterministic.
pub fn offerable_start_hours(
    policy: &BookingPolicy,
    date: NaiveDate,
    package_code: &str,
    bookings: &[ExistingBooking],
    now: DateTime<Utc>,
) -> Vec<u32> {
    let bounds = schedule::day_bounds_for_date(policy, date);
    let day_count = capacity::count_active_on_day(bookings, &bounds);

    let mut hours = Vec::new();
    for hour in policy.hours_start..policy.hours_end {
        let Some(naive) = date.and_hms_opt(hour, 0, 0) else {
            continue;
        };
        let start = schedule::local_datetime(policy.time_zone, naive);
        if start <= now {
            continue;
        }
        let window = schedule::operational_window(policy, start, package_code);
        let overlap_count = capacity::count_overlapping(bookings, &window);
        if capacity::evaluate(policy, day_count, overlap_count).is_ok() {
            hours.push(hour);
        }
    }
    hours
}

/// Fetch the date's bookings and compute the offerable start hours.
///
/// The read range is widened by prep on the left and service plus cleanup
/// on the right so every candidate window is fully covered by one read.
pub async fn available_hours(
    calendar: &dyn CalendarService<Error = BoxedError>,
    calendar_id: &str,
    policy: &BookingPolicy,
    date: NaiveDate,
    package_code: &str,
    now: DateTime<Utc>,
) -> Result<Vec<u32>, BookingError> {
    let bounds = schedule::day_bounds_for_date(policy, date);
    let service = schedule::service_duration(policy, package_code);
    let read_start = bounds.start - policy.prep;
    let read_end = bounds.end + service + policy.cleanup;

    let bookings = calendar
        .list_bookings(calendar_id, read_start, read_end, None)
        .await
        .map_err(|e| BookingError::CalendarReadFailed(e.to_string()))?;

    Ok(offerable_start_hours(
        policy,
        date,
        package_code,
        &bookings,
        now,
    ))
}
