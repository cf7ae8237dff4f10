#[cfg(test)]
mod tests {
    use crate::error::StripeError;
    use crate::logic::{
        booking_request_from_session, verify_stripe_signature, StripeCheckoutSessionObject,
        StripeCustomerDetails,
    };
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "whsec_test_secret";
    const TOLERANCE: i64 = 600;

    /// Builds a Stripe-Signature header the way Stripe does: HMAC-SHA256
    /// over "{t}.{body}" with the signing secret.
    fn sign(body: &str, secret: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, body).as_bytes());
        format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        )
    }

    fn session_with_metadata(
        metadata: HashMap<String, String>,
    ) -> StripeCheckoutSessionObject {
        StripeCheckoutSessionObject {
            id: "cs_test_123".to_string(),
            amount_total: Some(150000),
            currency: Some("chf".to_string()),
            customer_details: None,
            metadata: Some(metadata),
            payment_status: Some("paid".to_string()),
            client_reference_id: None,
        }
    }

    #[test]
    fn valid_signature_is_accepted() {
        let body = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let header = sign(body, SECRET);
        assert!(
            verify_stripe_signature(body.as_bytes(), Some(&header), SECRET, TOLERANCE).is_ok()
        );
    }

    #[test]
    fn tampered_body_is_rejected() {
        let body = r#"{"id":"evt_1"}"#;
        let header = sign(body, SECRET);
        let result = verify_stripe_signature(
            br#"{"id":"evt_tampered"}"#,
            Some(&header),
            SECRET,
            TOLERANCE,
        );
        assert!(matches!(
            result,
            Err(StripeError::WebhookSignatureError(_))
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let body = r#"{"id":"evt_1"}"#;
        let header = sign(body, "whsec_other_secret");
        let result = verify_stripe_signature(body.as_bytes(), Some(&header), SECRET, TOLERANCE);
        assert!(matches!(
            result,
            Err(StripeError::WebhookSignatureError(_))
        ));
    }

    #[test]
    fn missing_header_is_rejected() {
        let result = verify_stripe_signature(b"{}", None, SECRET, TOLERANCE);
        assert!(matches!(
            result,
            Err(StripeError::WebhookSignatureError(_))
        ));
    }

    #[test]
    fn header_without_v1_signature_is_rejected() {
        let result =
            verify_stripe_signature(b"{}", Some("t=1700000000,v0=abcdef"), SECRET, TOLERANCE);
        assert!(matches!(
            result,
            Err(StripeError::WebhookSignatureError(_))
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        // A header signed far in the past fails the tolerance check even
        // though the signature itself is consistent.
        let body = r#"{"id":"evt_1"}"#;
        let timestamp = 1_600_000_000i64;
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, body).as_bytes());
        let header = format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        );
        let result = verify_stripe_signature(body.as_bytes(), Some(&header), SECRET, TOLERANCE);
        assert!(matches!(
            result,
            Err(StripeError::WebhookSignatureError(_))
        ));
    }

    #[test]
    fn session_metadata_maps_to_booking_request() {
        let metadata: HashMap<String, String> = [
            ("customer_name", "Muster AG"),
            ("package_code", "medium"),
            ("offering", "bbq"),
            ("start_time", "2026-09-05T14:00:00+02:00"),
            ("venue", "Seestrasse 12, Zurich"),
            ("contact_emails", "events@muster.example, chef@muster.example"),
            ("total_amount", "150000"),
            ("deposit_amount", "30000"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let request = booking_request_from_session(&session_with_metadata(metadata)).unwrap();

        assert_eq!(request.customer_name, "Muster AG");
        assert_eq!(request.package_code, "medium");
        assert_eq!(request.offering, "bbq");
        assert_eq!(request.start_time.to_rfc3339(), "2026-09-05T12:00:00+00:00");
        assert_eq!(request.venue.as_deref(), Some("Seestrasse 12, Zurich"));
        assert_eq!(
            request.contact_emails,
            vec!["events@muster.example", "chef@muster.example"]
        );
        assert_eq!(request.total_amount, Some(150000));
        assert_eq!(request.deposit_amount, Some(30000));
        // The session id is the idempotency token.
        assert_eq!(request.idempotency_key.as_deref(), Some("cs_test_123"));
    }

    #[test]
    fn customer_details_fill_missing_name_and_email() {
        let metadata: HashMap<String, String> = [
            ("package_code", "small"),
            ("offering", "buffet"),
            ("start_time", "2026-09-05T10:00:00Z"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let mut session = session_with_metadata(metadata);
        session.customer_details = Some(StripeCustomerDetails {
            email: Some("buyer@example.com".to_string()),
            name: Some("Jane Buyer".to_string()),
            phone: None,
        });

        let request = booking_request_from_session(&session).unwrap();
        assert_eq!(request.customer_name, "Jane Buyer");
        assert_eq!(request.contact_emails, vec!["buyer@example.com"]);
        // amount_total backfills the missing metadata total.
        assert_eq!(request.total_amount, Some(150000));
    }

    #[test]
    fn missing_start_time_is_a_processing_error() {
        let metadata: HashMap<String, String> = [
            ("customer_name", "Muster AG"),
            ("package_code", "medium"),
            ("offering", "bbq"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let result = booking_request_from_session(&session_with_metadata(metadata));
        assert!(matches!(
            result,
            Err(StripeError::WebhookProcessingError(_))
        ));
    }
}
