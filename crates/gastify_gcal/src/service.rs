// --- File: crates/gastify_gcal/src/service.rs ---
//! Google Calendar implementation of the `CalendarService` trait.
//!
//! Bookings are ordinary calendar events. The structured tag map lands in
//! the event's private extended properties, which is also what the
//! tag-filtered list (idempotency lookup) queries server-side.

use chrono::{DateTime, Utc};
use gastify_common::services::{
    BookingRecord, CalendarService, CreatedBooking, ExistingBooking, IDEMPOTENCY_TAG_KEY,
};
use google_calendar3::api::{Event, EventAttendee, EventDateTime, EventExtendedProperties};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::auth::HubType;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Calendar returned an incomplete event: {0}")]
    IncompleteEvent(String),
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    /// Create a new Google Calendar service.
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Lists bookings intersecting `[start, end)`, ordered by start time.
    ///
    /// Cancelled events are included (`show_deleted`) so callers can apply
    /// their own cancelled-flag filtering; all-day entries carry no
    /// concrete instants and are skipped. With `idempotency_tag` set, the
    /// filter runs server-side against the private extended properties.
    fn list_bookings(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        idempotency_tag: Option<&str>,
    ) -> std::pin::Pin<
        Box<
            dyn std::future::Future<Output = Result<Vec<ExistingBooking>, Self::Error>>
                + Send
                + '_,
        >,
    > {
        let calendar_id = calendar_id.to_string();
        let idempotency_tag = idempotency_tag.map(|s| s.to_string());
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let mut request = calendar_hub
                .events()
                .list(&calendar_id)
                .time_min(start)
                .time_max(end)
                .single_events(true) // Expand recurring events
                .order_by("startTime")
                .max_results(250)
                .show_deleted(true);

            if let Some(tag) = &idempotency_tag {
                request = request
                    .add_private_extended_property(&format!("{}={}", IDEMPOTENCY_TAG_KEY, tag));
            }

            let (_, events_list) = request.doit().await?;

            let mut bookings = Vec::new();
            if let Some(items) = events_list.items {
                for event in items {
                    let cancelled = event.status.as_deref() == Some("cancelled");

                    let (Some(event_start), Some(event_end)) = (
                        event.start.as_ref().and_then(|s| s.date_time),
                        event.end.as_ref().and_then(|e| e.date_time),
                    ) else {
                        // All-day entries never occupy a bookable slot.
                        debug!("skipping event without concrete start/end instants");
                        continue;
                    };

                    let tags = event
                        .extended_properties
                        .and_then(|p| p.private)
                        .unwrap_or_default();

                    bookings.push(ExistingBooking {
                        event_id: event.id.unwrap_or_default(),
                        summary: event.summary.unwrap_or_default(),
                        start: event_start,
                        end: event_end,
                        cancelled,
                        idempotency_tag: tags.get(IDEMPOTENCY_TAG_KEY).cloned(),
                    });
                }
            }
            bookings.sort_by_key(|b| b.start);
            Ok(bookings)
        })
    }

    /// Commits a booking record as a new calendar event.
    ///
    /// The tag map (idempotency token included) is stored in the event's
    /// private extended properties; attendees and location map directly.
    fn create_booking(
        &self,
        calendar_id: &str,
        record: BookingRecord,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<CreatedBooking, Self::Error>> + Send + '_>,
    > {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let attendees: Vec<EventAttendee> = record
                .attendees
                .iter()
                .map(|email| EventAttendee {
                    email: Some(email.clone()),
                    ..Default::default()
                })
                .collect();

            let new_event = Event {
                summary: Some(record.summary),
                description: Some(record.description),
                location: record.location,
                start: Some(EventDateTime {
                    date_time: Some(record.start),
                    time_zone: Some(record.time_zone.clone()),
                    ..Default::default()
                }),
                end: Some(EventDateTime {
                    date_time: Some(record.end),
                    time_zone: Some(record.time_zone),
                    ..Default::default()
                }),
                attendees: if attendees.is_empty() {
                    None
                } else {
                    Some(attendees)
                },
                extended_properties: Some(EventExtendedProperties {
                    private: Some(record.tags),
                    ..Default::default()
                }),
                ..Default::default()
            };

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .doit()
                .await?;

            let event_id = created_event.id.ok_or_else(|| {
                GcalServiceError::IncompleteEvent("created event carries no id".to_string())
            })?;

            Ok(CreatedBooking {
                event_id,
                status: created_event
                    .status
                    .unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }

    /// Marks a booking as cancelled without deleting it.
    ///
    /// The sequence number is incremented so the change propagates to all
    /// calendar instances.
    fn mark_booking_cancelled(
        &self,
        calendar_id: &str,
        event_id: &str,
        notify_attendees: bool,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<CreatedBooking, Self::Error>> + Send + '_>,
    > {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let (_response, event) = calendar_hub
                .events()
                .get(&calendar_id, &event_id)
                .doit()
                .await?;

            let sequence = event.sequence.map(|n| n + 1).unwrap_or(1);

            let cancelled_event = Event {
                status: Some("cancelled".to_string()),
                sequence: Some(sequence),
                ..Default::default()
            };

            let (_response, updated) = calendar_hub
                .events()
                .patch(cancelled_event, &calendar_id, &event_id)
                .send_updates(if notify_attendees { "all" } else { "none" })
                .doit()
                .await?;

            Ok(CreatedBooking {
                event_id: updated.id.unwrap_or(event_id),
                status: updated.status.unwrap_or_else(|| "cancelled".to_string()),
            })
        })
    }
}
