// --- File: crates/gastify_stripe/src/logic.rs ---
//! Webhook verification and payload mapping.
//!
//! Stripe delivers `checkout.session.completed` events at least once; the
//! session id doubles as the idempotency token, so a redelivered event
//! resolves to the booking the first delivery committed.

use chrono::{DateTime, Utc};
use gastify_booking::logic::BookingRequest;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::debug;

use crate::error::StripeError;

// --- Data Structures ---

/// Represents the `data` field within a Stripe Event.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEventData {
    /// The actual object related to the event. `serde_json::Value` because
    /// the structure of 'object' varies by event type.
    pub object: serde_json::Value,
}

/// Represents the outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEvent {
    pub id: String,
    pub created: i64,
    pub livemode: bool,
    #[serde(rename = "type")]
    pub event_type: String, // e.g., "checkout.session.completed"
    pub data: StripeEventData,
}

/// The `data.object` for "checkout.session.completed" events; only the
/// fields the booking mapping cares about.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StripeCheckoutSessionObject {
    pub id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_details: Option<StripeCustomerDetails>,
    pub metadata: Option<HashMap<String, String>>,
    pub payment_status: Option<String>, // e.g., "paid", "unpaid"
    pub client_reference_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StripeCustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

// --- Webhook Signature Verification ---

/// Verifies the signature of an incoming Stripe webhook request.
///
/// # Arguments
/// * `payload_bytes` - The raw request body bytes.
/// * `sig_header` - The value of the 'Stripe-Signature' header.
/// * `secret` - The webhook signing secret (whsec_...).
/// * `tolerance_secs` - Maximum allowed clock skew for the `t` component.
pub fn verify_stripe_signature(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_secs: i64,
) -> Result<(), StripeError> {
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();

    for item in sig_header_value.split(',') {
        let parts: Vec<&str> = item.trim().splitn(2, '=').collect();
        if parts.len() == 2 {
            match parts[0] {
                "t" => timestamp_str = Some(parts[1]),
                "v1" => v1_signatures_hex.push(parts[1]),
                _ => {} // Ignore other parts like v0
            }
        }
    }

    let timestamp_str = timestamp_str.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing timestamp 't' in Stripe-Signature".to_string())
    })?;
    let parsed_timestamp = timestamp_str.parse::<i64>().map_err(|_| {
        StripeError::WebhookSignatureError(
            "Invalid timestamp format in Stripe-Signature".to_string(),
        )
    })?;

    if v1_signatures_hex.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    let current_timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| StripeError::WebhookSignatureError("System clock before epoch".to_string()))?
        .as_secs() as i64;
    if (current_timestamp - parsed_timestamp).abs() > tolerance_secs {
        return Err(StripeError::WebhookSignatureError(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    // Construct the signed payload string using the original string
    // timestamp from the header.
    let signed_payload_string = format!(
        "{}.{}",
        timestamp_str,
        String::from_utf8_lossy(payload_bytes)
    );

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(signed_payload_string.as_bytes());
    let calculated_signature_hex = hex::encode(mac.finalize().into_bytes());

    // Stripe may send several v1 signatures during secret rotation; a
    // match on any of them is sufficient.
    for provided_sig_hex in v1_signatures_hex {
        if constant_time_eq(
            calculated_signature_hex.as_bytes(),
            provided_sig_hex.as_bytes(),
        ) {
            return Ok(());
        }
    }
    debug!("no v1 signature matched the calculated signature");
    Err(StripeError::WebhookSignatureError(
        "Signature mismatch".to_string(),
    ))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// --- Payload Mapping ---

/// Map a completed checkout session to a booking request.
///
/// The booking fields travel in the session metadata the checkout was
/// created with; customer details fill the gaps. The session id becomes
/// the idempotency token, which is what makes redelivery a no-op. A
/// missing or unparseable start time is unrecoverable for this event and
/// reported as a processing error.
pub fn booking_request_from_session(
    session: &StripeCheckoutSessionObject,
) -> Result<BookingRequest, StripeError> {
    let metadata = session.metadata.clone().unwrap_or_default();

    let start_time = metadata
        .get("start_time")
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            StripeError::WebhookProcessingError(
                "missing or invalid start_time in session metadata".to_string(),
            )
        })?;

    let customer_name = metadata
        .get("customer_name")
        .cloned()
        .or_else(|| {
            session
                .customer_details
                .as_ref()
                .and_then(|d| d.name.clone())
        })
        .unwrap_or_default();

    let contact_emails: Vec<String> = metadata
        .get("contact_emails")
        .map(|raw| {
            raw.split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect()
        })
        .or_else(|| {
            session
                .customer_details
                .as_ref()
                .and_then(|d| d.email.clone())
                .map(|email| vec![email])
        })
        .unwrap_or_default();

    let total_amount = metadata
        .get("total_amount")
        .and_then(|raw| raw.parse::<i64>().ok())
        .or(session.amount_total);
    let deposit_amount = metadata
        .get("deposit_amount")
        .and_then(|raw| raw.parse::<i64>().ok());

    Ok(BookingRequest {
        customer_name,
        package_code: metadata.get("package_code").cloned().unwrap_or_default(),
        offering: metadata.get("offering").cloned().unwrap_or_default(),
        start_time,
        venue: metadata.get("venue").cloned(),
        contact_emails,
        total_amount,
        deposit_amount,
        idempotency_key: Some(session.id.clone()),
    })
}
