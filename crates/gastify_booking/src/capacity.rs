// --- File: crates/gastify_booking/src/capacity.rs ---
//! Capacity evaluator.
//!
//! Decides whether a candidate operational window is admissible under the
//! day-count and overlap-count limits. Cancelled bookings never count.

use crate::policy::BookingPolicy;
use crate::schedule::{DayBounds, OperationalWindow};
use gastify_common::services::ExistingBooking;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("daily booking limit reached ({active} active)")]
    DayCapacityExceeded { active: usize },
    #[error("too many concurrent bookings ({overlapping} overlapping)")]
    OverlapCapacityExceeded { overlapping: usize },
}

/// Non-cancelled bookings whose span intersects the day bounds.
pub fn count_active_on_day(bookings: &[ExistingBooking], bounds: &DayBounds) -> usize {
    bookings
        .iter()
        .filter(|b| !b.cancelled && b.start < bounds.end && b.end > bounds.start)
        .count()
}

/// Non-cancelled bookings overlapping the candidate window.
///
/// Half-open test: a booking ending exactly at the window start, or
/// starting exactly at its end, does not conflict.
pub fn count_overlapping(bookings: &[ExistingBooking], window: &OperationalWindow) -> usize {
    bookings
        .iter()
        .filter(|b| !b.cancelled && !(b.end <= window.start || b.start >= window.end))
        .count()
}

/// Admission verdict. The coarse day cap is checked before the overlap cap,
/// so a day-exhausted request always reports the day limit.
pub fn evaluate(
    policy: &BookingPolicy,
    day_count: usize,
    overlap_count: usize,
) -> Result<(), CapacityError> {
    if day_count >= policy.max_per_day {
        return Err(CapacityError::DayCapacityExceeded { active: day_count });
    }
    if overlap_count >= policy.max_per_slot {
        return Err(CapacityError::OverlapCapacityExceeded {
            overlapping: overlap_count,
        });
    }
    Ok(())
}
