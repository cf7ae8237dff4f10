// File: crates/gastify_booking/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    AdminBooking, AvailabilityQuery, AvailabilityResponse, BookedEventsQuery,
    BookedEventsResponse, CancelBookingRequest, CancellationResponse, DirectBookingRequest,
    DirectBookingResponse,
};

#[utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Offerable start hours for the date", body = AvailabilityResponse),
        (status = 400, description = "Invalid date format"),
        (status = 500, description = "Calendar read failed")
    )
)]
fn doc_get_availability_handler() {}

#[utoipa::path(
    post,
    path = "/book",
    request_body(content = DirectBookingRequest, example = json!({
        "pin": "4711",
        "customer_name": "Muster AG",
        "package_code": "medium",
        "offering": "bbq",
        "start_time": "2026-09-05T14:00:00+02:00",
        "venue": "Seestrasse 12, Zurich",
        "contact_emails": ["events@muster.example"],
        "total_amount": 150000,
        "deposit_amount": 30000,
        "reference": "order-2026-0917"
    })),
    responses(
        (status = 200, description = "Booking committed (or already existed for the reference)", body = DirectBookingResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unknown or revoked PIN"),
        (status = 409, description = "Outside business hours or capacity exhausted"),
        (status = 500, description = "Calendar read or write failed")
    )
)]
fn doc_direct_book_handler() {}

#[utoipa::path(
    get,
    path = "/admin/bookings",
    params(
        ("start_date" = String, Query, description = "Start date in YYYY-MM-DD format"),
        ("end_date" = String, Query, description = "End date in YYYY-MM-DD format"),
        ("include_cancelled" = bool, Query, description = "Whether to include cancelled bookings")
    ),
    responses(
        (status = 200, description = "Committed bookings in the range", body = BookedEventsResponse),
        (status = 400, description = "Invalid date format"),
        (status = 500, description = "Calendar read failed")
    )
)]
fn doc_get_booked_events_handler() {}

#[utoipa::path(
    patch,
    path = "/admin/mark_cancelled/{event_id}",
    params(
        ("event_id" = String, Path, description = "The id of the booking to mark as cancelled"),
        ("notify_attendees" = bool, Query, description = "Whether to notify attendees")
    ),
    responses(
        (status = 200, description = "Cancellation result", body = CancellationResponse),
        (status = 404, description = "Booking not found"),
        (status = 500, description = "Cancellation failed")
    )
)]
fn doc_mark_booking_cancelled_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_availability_handler,
        doc_direct_book_handler,
        doc_get_booked_events_handler,
        doc_mark_booking_cancelled_handler
    ),
    components(
        schemas(
            AvailabilityQuery,
            AvailabilityResponse,
            DirectBookingRequest,
            DirectBookingResponse,
            BookedEventsQuery,
            AdminBooking,
            BookedEventsResponse,
            CancelBookingRequest,
            CancellationResponse
        )
    ),
    tags(
        (name = "booking", description = "Catering slot booking API")
    ),
    servers(
        (url = "/api", description = "Main API prefix")
    )
)]
pub struct BookingApiDoc;
