// --- File: crates/gastify_stripe/src/routes.rs ---

use crate::handlers::{stripe_webhook_handler, StripeState};
use axum::{routing::post, Router};
use std::sync::Arc;

/// Creates a router containing all routes for the Stripe trigger.
pub fn routes(state: Arc<StripeState>) -> Router {
    Router::new()
        .route("/stripe/webhook", post(stripe_webhook_handler))
        .with_state(state)
}
