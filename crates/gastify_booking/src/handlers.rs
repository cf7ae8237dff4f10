// --- File: crates/gastify_booking/src/handlers.rs ---
use crate::logic::{
    admit_booking, available_hours, BookingError, BookingOutcome, BookingRequest,
};
use crate::policy::BookingPolicy;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use gastify_common::services::{AffiliateService, BoxedError, CalendarService};
use gastify_common::{
    auth_error, config_error, conflict, external_service_error, internal_error, validation_error,
    IntoHttpResponse,
};
use gastify_config::AppConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

// Shared state for all booking handlers. The calendar and affiliate
// services are wired by the backend's service factory.
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub policy: Arc<BookingPolicy>,
    pub calendar_id: String,
    pub calendar: Arc<dyn CalendarService<Error = BoxedError>>,
    pub affiliates: Option<Arc<dyn AffiliateService<Error = BoxedError>>>,
}

// --- Availability ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2026-09-05"))]
    pub date: String,
    /// Package code (e.g. small, medium, large)
    #[cfg_attr(feature = "openapi", schema(example = "medium"))]
    pub package: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailabilityResponse {
    pub date: String,
    pub package: String,
    pub time_zone: String,
    /// Offerable local start hours for the date.
    pub start_hours: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Handler to list offerable start hours for a date and package.
#[axum::debug_handler]
pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, String)> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid date format (YYYY-MM-DD)".to_string(),
        )
    })?;

    let hours = match available_hours(
        state.calendar.as_ref(),
        &state.calendar_id,
        &state.policy,
        date,
        &query.package,
        Utc::now(),
    )
    .await
    {
        Ok(hours) => hours,
        Err(e) => {
            info!("Error computing availability: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to query calendar availability".to_string(),
            ));
        }
    };

    // Pricing is informational; the tier may not exist for lenient codes.
    let tier = state
        .config
        .booking
        .packages
        .iter()
        .find(|t| t.code.eq_ignore_ascii_case(query.package.trim()));
    let currency = tier.and_then(|t| t.currency.clone()).or_else(|| {
        state
            .config
            .stripe
            .as_ref()
            .and_then(|s| s.default_currency.clone())
    });

    Ok(Json(AvailabilityResponse {
        date: query.date,
        package: query.package,
        time_zone: state.policy.time_zone.name().to_string(),
        start_hours: hours,
        display_name: tier.and_then(|t| t.display_name.clone()),
        unit_amount: tier.and_then(|t| t.unit_amount),
        currency,
    }))
}

// --- Direct Booking ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DirectBookingRequest {
    /// Affiliate access credential.
    pub pin: String,
    pub customer_name: String,
    pub package_code: String,
    pub offering: String,
    /// Requested service start, RFC3339 with offset.
    pub start_time: String,
    pub venue: Option<String>,
    #[serde(default)]
    pub contact_emails: Vec<String>,
    pub total_amount: Option<i64>,
    pub deposit_amount: Option<i64>,
    /// Optional caller reference, used as the idempotency token.
    pub reference: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DirectBookingResponse {
    pub success: bool,
    pub event_id: Option<String>,
    pub already_booked: bool,
    pub message: String,
}

/// Handler for the synchronous direct-booking API.
///
/// 200 success (including the idempotent no-op), 400 invalid input,
/// 401 invalid credential, 409 capacity or hours conflict, 5xx external
/// failure.
#[axum::debug_handler]
pub async fn direct_book_handler(
    State(state): State<Arc<BookingState>>,
    Json(payload): Json<DirectBookingRequest>,
) -> Result<Json<DirectBookingResponse>, Response> {
    let affiliates = state
        .affiliates
        .as_ref()
        .ok_or_else(|| config_error("Affiliate lookup not configured.").into_response())?;

    let affiliate = affiliates
        .verify_pin(payload.pin.trim())
        .await
        .map_err(|e| external_service_error("affiliate", e).into_response())?
        .ok_or_else(|| auth_error("Unknown or revoked PIN.").into_response())?;
    debug!(affiliate = %affiliate.affiliate_id, "direct booking request authenticated");

    let start_time = DateTime::parse_from_rfc3339(&payload.start_time)
        .map_err(|_| {
            validation_error("start_time must be an RFC3339 timestamp").into_response()
        })?
        .with_timezone(&Utc);

    let request = BookingRequest {
        customer_name: payload.customer_name,
        package_code: payload.package_code,
        offering: payload.offering,
        start_time,
        venue: payload.venue,
        contact_emails: payload.contact_emails,
        total_amount: payload.total_amount,
        deposit_amount: payload.deposit_amount,
        idempotency_key: payload.reference,
    };

    match admit_booking(
        state.calendar.as_ref(),
        &state.calendar_id,
        &state.policy,
        &request,
    )
    .await
    {
        Ok(BookingOutcome::Booked { event_id }) => Ok(Json(DirectBookingResponse {
            success: true,
            event_id: Some(event_id),
            already_booked: false,
            message: "Booking confirmed.".to_string(),
        })),
        Ok(BookingOutcome::AlreadyBooked { event_id }) => Ok(Json(DirectBookingResponse {
            success: true,
            event_id: Some(event_id),
            already_booked: true,
            message: "Booking already exists for this reference.".to_string(),
        })),
        Err(err) => Err(booking_error_response(err)),
    }
}

/// Single place where orchestrator rejections become HTTP responses.
pub(crate) fn booking_error_response(err: BookingError) -> Response {
    match err {
        BookingError::MissingFields(detail) => validation_error(detail).into_http_response(),
        e @ (BookingError::OutsideBusinessHours { .. }
        | BookingError::DayCapacityExceeded { .. }
        | BookingError::OverlapCapacityExceeded { .. }) => conflict(e).into_http_response(),
        BookingError::CalendarReadFailed(e) => {
            internal_error(format!("calendar read failed: {}", e)).into_http_response()
        }
        BookingError::CalendarWriteFailed(e) => {
            internal_error(format!("calendar write failed: {}", e)).into_http_response()
        }
    }
}

// --- Admin ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookedEventsQuery {
    pub start_date: String,
    pub end_date: String,
    pub include_cancelled: Option<bool>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AdminBooking {
    pub event_id: String,
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub cancelled: bool,
    pub reference: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookedEventsResponse {
    pub bookings: Vec<AdminBooking>,
}

/// Handler to list committed bookings in a local date range.
#[axum::debug_handler]
pub async fn get_booked_events_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<BookedEventsQuery>,
) -> Result<Json<BookedEventsResponse>, (StatusCode, String)> {
    let start_date = NaiveDate::parse_from_str(&query.start_date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid start_date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    let end_date = NaiveDate::parse_from_str(&query.end_date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid end_date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    if end_date < start_date {
        return Err((
            StatusCode::BAD_REQUEST,
            "end_date must be after start_date".to_string(),
        ));
    }

    let range_start = crate::schedule::day_bounds_for_date(&state.policy, start_date).start;
    let range_end = crate::schedule::day_bounds_for_date(&state.policy, end_date).end;
    let include_cancelled = query.include_cancelled.unwrap_or(false);

    match state
        .calendar
        .list_bookings(&state.calendar_id, range_start, range_end, None)
        .await
    {
        Ok(bookings) => {
            let bookings = bookings
                .into_iter()
                .filter(|b| include_cancelled || !b.cancelled)
                .map(|b| AdminBooking {
                    event_id: b.event_id,
                    summary: b.summary,
                    start_time: b.start.to_rfc3339(),
                    end_time: b.end.to_rfc3339(),
                    cancelled: b.cancelled,
                    reference: b.idempotency_tag,
                })
                .collect();
            Ok(Json(BookedEventsResponse { bookings }))
        }
        Err(e) => {
            info!("Error fetching booked events: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch booked events".to_string(),
            ))
        }
    }
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancelBookingRequest {
    pub notify_attendees: Option<bool>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancellationResponse {
    pub success: bool,
    pub message: String,
}

/// Handler to mark a booking as cancelled without deleting it.
#[axum::debug_handler]
pub async fn mark_booking_cancelled_handler(
    State(state): State<Arc<BookingState>>,
    Path(event_id): Path<String>,
    Query(params): Query<CancelBookingRequest>,
) -> Result<Json<CancellationResponse>, (StatusCode, String)> {
    let notify_attendees = params.notify_attendees.unwrap_or(true);

    match state
        .calendar
        .mark_booking_cancelled(&state.calendar_id, &event_id, notify_attendees)
        .await
    {
        Ok(_) => Ok(Json(CancellationResponse {
            success: true,
            message: "Booking marked as cancelled successfully.".to_string(),
        })),
        Err(e) => {
            info!("Error marking booking as cancelled: {}", e);
            if e.to_string().contains("404") {
                return Err((StatusCode::NOT_FOUND, "Booking not found.".to_string()));
            }
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to mark booking as cancelled.".to_string(),
            ))
        }
    }
}
