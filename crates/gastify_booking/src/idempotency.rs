// --- File: crates/gastify_booking/src/idempotency.rs ---
//! Idempotency guard.
//!
//! A booking request may be delivered more than once (payment webhooks are
//! at-least-once). The guard resolves a token to the booking it already
//! committed, if any, via a tag-filtered day-scoped calendar read. Requests
//! without a token bypass the guard entirely; that is an accepted product
//! trade-off, not an oversight.

use crate::schedule::DayBounds;
use gastify_common::services::{BoxedError, CalendarService, ExistingBooking};

/// First non-cancelled booking carrying the token.
pub fn find_match<'a>(
    bookings: &'a [ExistingBooking],
    token: &str,
) -> Option<&'a ExistingBooking> {
    bookings
        .iter()
        .find(|b| !b.cancelled && b.idempotency_tag.as_deref() == Some(token))
}

/// Look the token up in the store, scoped to the request's calendar day.
pub async fn lookup(
    calendar: &dyn CalendarService<Error = BoxedError>,
    calendar_id: &str,
    token: &str,
    bounds: &DayBounds,
) -> Result<Option<String>, BoxedError> {
    let tagged = calendar
        .list_bookings(calendar_id, bounds.start, bounds.end, Some(token))
        .await?;
    Ok(find_match(&tagged, token).map(|b| b.event_id.clone()))
}
