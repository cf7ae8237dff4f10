// --- File: crates/gastify_stripe/src/error.rs ---
use thiserror::Error;

/// Errors raised while receiving and mapping Stripe webhook events.
#[derive(Error, Debug)]
pub enum StripeError {
    #[error("Webhook signature error: {0}")]
    WebhookSignatureError(String),

    #[error("Webhook processing error: {0}")]
    WebhookProcessingError(String),

    #[error("Failed to parse Stripe payload: {0}")]
    ParseError(String),
}

impl From<serde_json::Error> for StripeError {
    fn from(err: serde_json::Error) -> Self {
        StripeError::ParseError(err.to_string())
    }
}
