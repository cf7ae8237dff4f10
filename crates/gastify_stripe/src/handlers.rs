// --- File: crates/gastify_stripe/src/handlers.rs ---
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use gastify_booking::logic::admit_booking;
use gastify_booking::policy::BookingPolicy;
use gastify_common::services::{BoxedError, CalendarService};
use gastify_config::AppConfig;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::logic::{
    booking_request_from_session, verify_stripe_signature, StripeCheckoutSessionObject,
    StripeEvent,
};

const DEFAULT_TOLERANCE_SECS: i64 = 600; // 10 minutes

// --- State for Stripe Handlers ---
#[derive(Clone)]
pub struct StripeState {
    pub config: Arc<AppConfig>,
    pub policy: Arc<BookingPolicy>,
    pub calendar_id: String,
    pub calendar: Arc<dyn CalendarService<Error = BoxedError>>,
}

/// Axum handler for the Stripe webhook.
///
/// Business-rule rejections are acknowledged with 200 and recorded for the
/// operator: redelivering the same event cannot turn a rejected booking
/// into an accepted one, and an unacknowledged event would retry for days.
/// Only calendar I/O failures return 500 so Stripe redelivers; the
/// idempotency guard makes that redelivery safe.
#[axum::debug_handler]
pub async fn stripe_webhook_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !state.config.use_stripe {
        return (StatusCode::SERVICE_UNAVAILABLE, "Stripe service disabled.").into_response();
    }

    // --- Verify Signature ---
    let webhook_secret = match std::env::var("STRIPE_WEBHOOK_SECRET") {
        Ok(s) => s,
        Err(_) => {
            error!("STRIPE_WEBHOOK_SECRET environment variable not set");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let tolerance = state
        .config
        .stripe
        .as_ref()
        .and_then(|s| s.webhook_tolerance_secs)
        .unwrap_or(DEFAULT_TOLERANCE_SECS);

    let sig_header = headers.get("Stripe-Signature").and_then(|h| h.to_str().ok());
    if let Err(e) = verify_stripe_signature(body.as_bytes(), sig_header, &webhook_secret, tolerance)
    {
        warn!("Stripe webhook signature verification failed: {}", e);
        return (StatusCode::BAD_REQUEST, format!("Invalid signature: {}", e)).into_response();
    }

    // --- Process Payload ---
    // Deserialize the raw body AFTER signature verification.
    let event: StripeEvent = match serde_json::from_str(&body) {
        Ok(ev) => ev,
        Err(e) => {
            warn!("Failed to deserialize Stripe webhook event: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid payload format".to_string()).into_response();
        }
    };

    if event.event_type != "checkout.session.completed" {
        debug!(event_type = %event.event_type, "ignoring Stripe event type");
        return StatusCode::OK.into_response();
    }

    let session: StripeCheckoutSessionObject = match serde_json::from_value(event.data.object) {
        Ok(session) => session,
        Err(e) => {
            // Malformed session objects will not improve on redelivery.
            warn!(event_id = %event.id, "unreadable checkout session object: {}", e);
            return StatusCode::OK.into_response();
        }
    };

    if session.payment_status.as_deref() != Some("paid") {
        info!(session_id = %session.id, status = ?session.payment_status, "session completed without payment, nothing to book");
        return StatusCode::OK.into_response();
    }

    let request = match booking_request_from_session(&session) {
        Ok(request) => request,
        Err(e) => {
            warn!(session_id = %session.id, "cannot map session to booking request: {}", e);
            return StatusCode::OK.into_response();
        }
    };

    match admit_booking(
        state.calendar.as_ref(),
        &state.calendar_id,
        &state.policy,
        &request,
    )
    .await
    {
        Ok(outcome) => {
            info!(session_id = %session.id, event_id = outcome.event_id(), "payment trigger fulfilled");
            StatusCode::OK.into_response()
        }
        Err(err) if err.is_business_rejection() => {
            warn!(session_id = %session.id, "payment received but booking rejected: {}", err);
            StatusCode::OK.into_response()
        }
        Err(err) => {
            error!(session_id = %session.id, "calendar unavailable, requesting redelivery: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Webhook processing error: {}", err),
            )
                .into_response()
        }
    }
}
