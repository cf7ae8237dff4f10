// --- File: crates/gastify_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! The booking core never talks to Google Calendar or the affiliate
//! directory directly; it goes through these traits so the orchestrator can
//! be exercised against in-memory implementations in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Tag key under which the idempotency token is stored on committed
/// bookings. Shared between the orchestrator (which writes it) and the
/// calendar implementations (which filter on it).
pub const IDEMPOTENCY_TAG_KEY: &str = "idempotency_key";

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A trait for calendar store operations.
///
/// The shared calendar is the single source of truth for committed
/// bookings; this trait covers the three operations the core needs: a
/// range-scoped read (optionally filtered by idempotency tag), a single
/// commit, and an administrative cancel.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// List bookings whose span intersects `[start, end)`, ordered by start
    /// time. When `idempotency_tag` is given, only bookings carrying that
    /// tag are returned. Implementations must support at least 250 results
    /// per call (enough for one calendar day).
    #[allow(clippy::type_complexity)]
    fn list_bookings(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        idempotency_tag: Option<&str>,
    ) -> BoxFuture<'_, Vec<ExistingBooking>, Self::Error>;

    /// Commit a booking record to the store, exactly once per call.
    fn create_booking(
        &self,
        calendar_id: &str,
        record: BookingRecord,
    ) -> BoxFuture<'_, CreatedBooking, Self::Error>;

    /// Mark a committed booking as cancelled without deleting it.
    fn mark_booking_cancelled(
        &self,
        calendar_id: &str,
        event_id: &str,
        notify_attendees: bool,
    ) -> BoxFuture<'_, CreatedBooking, Self::Error>;
}

/// A trait for affiliate PIN resolution.
///
/// The direct booking API authenticates with a PIN that an external
/// affiliate directory resolves to an affiliate record (or nothing).
pub trait AffiliateService: Send + Sync {
    /// Error type returned by affiliate lookups.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve a PIN. `None` means the credential is unknown or revoked.
    fn verify_pin(&self, pin: &str) -> BoxFuture<'_, Option<Affiliate>, Self::Error>;
}

/// A factory for creating service instances.
pub trait ServiceFactory: Send + Sync {
    /// Get a calendar service instance.
    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>>;

    /// Get an affiliate service instance.
    fn affiliate_service(&self) -> Option<Arc<dyn AffiliateService<Error = BoxedError>>>;
}

/// The record handed to the store on commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Human-readable title of the booking.
    pub summary: String,
    /// Free-text description (operator-facing details).
    pub description: String,
    /// Optional venue / location string.
    pub location: Option<String>,
    /// Start of the operational window.
    pub start: DateTime<Utc>,
    /// End of the operational window.
    pub end: DateTime<Utc>,
    /// IANA timezone name the instants are presented in.
    pub time_zone: String,
    /// Attendee email addresses.
    pub attendees: Vec<String>,
    /// Opaque structured tags, e.g. the idempotency token. Stored so later
    /// reads can filter on them.
    pub tags: HashMap<String, String>,
}

/// Result of a commit or cancel operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedBooking {
    /// The external id of the booking.
    pub event_id: String,
    /// The store-side status, e.g. "confirmed" or "cancelled".
    pub status: String,
}

/// Read-only projection of a previously committed booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingBooking {
    /// The external id of the booking.
    pub event_id: String,
    /// Title as stored.
    pub summary: String,
    /// Start of the occupied span (operational window).
    pub start: DateTime<Utc>,
    /// End of the occupied span.
    pub end: DateTime<Utc>,
    /// Whether the booking has been cancelled in the store.
    pub cancelled: bool,
    /// The idempotency tag the booking was committed with, if any.
    pub idempotency_tag: Option<String>,
}

/// A resolved affiliate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliate {
    /// Stable identifier of the affiliate.
    pub affiliate_id: String,
    /// Display name for summaries and logs.
    pub display_name: Option<String>,
}
