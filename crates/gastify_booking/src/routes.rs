// --- File: crates/gastify_booking/src/routes.rs ---

use crate::handlers::{
    direct_book_handler, get_availability_handler, get_booked_events_handler,
    mark_booking_cancelled_handler, BookingState,
};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the booking feature.
/// The state (calendar + affiliate wiring) comes from the backend's
/// service factory.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/book", post(direct_book_handler))
        .route("/admin/bookings", get(get_booked_events_handler))
        .route(
            "/admin/mark_cancelled/{event_id}",
            patch(mark_booking_cancelled_handler),
        )
        .with_state(state)
}
