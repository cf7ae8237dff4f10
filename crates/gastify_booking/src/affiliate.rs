// --- File: crates/gastify_booking/src/affiliate.rs ---
//! Affiliate PIN lookup client.
//!
//! The direct booking API authenticates callers with a PIN that an external
//! affiliate directory resolves. This is the HTTP-backed implementation of
//! the `AffiliateService` trait.

use gastify_common::http::client::create_client;
use gastify_common::services::{Affiliate, AffiliateService, BoxFuture};
use gastify_common::HTTP_CLIENT;
use gastify_config::AffiliateConfig;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum AffiliateError {
    #[error("affiliate lookup request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("affiliate lookup returned an unexpected payload: {0}")]
    ParseError(String),
}

/// Wire shape of the directory's lookup response.
#[derive(Deserialize, Debug)]
struct PinLookupResponse {
    valid: bool,
    affiliate_id: Option<String>,
    display_name: Option<String>,
}

pub struct HttpAffiliateService {
    lookup_url: String,
    client: Client,
}

impl HttpAffiliateService {
    pub fn new(config: &AffiliateConfig) -> Self {
        let client = create_client(config.timeout_secs.unwrap_or(10), true)
            .unwrap_or_else(|_| HTTP_CLIENT.clone());
        Self {
            lookup_url: config.lookup_url.clone(),
            client,
        }
    }
}

impl AffiliateService for HttpAffiliateService {
    type Error = AffiliateError;

    fn verify_pin(&self, pin: &str) -> BoxFuture<'_, Option<Affiliate>, Self::Error> {
        let pin = pin.to_string();

        Box::pin(async move {
            let response = self
                .client
                .get(&self.lookup_url)
                .query(&[("pin", pin.as_str())])
                .send()
                .await?;

            // The directory answers 404 for unknown PINs.
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let payload: PinLookupResponse = response.error_for_status()?.json().await?;
            debug!(valid = payload.valid, "affiliate lookup answered");
            resolve_lookup(payload)
        })
    }
}

/// Map the wire payload to a resolved affiliate. `valid: false` means the
/// credential is unknown or revoked; a valid entry without an id is a
/// directory-side contract violation.
fn resolve_lookup(payload: PinLookupResponse) -> Result<Option<Affiliate>, AffiliateError> {
    if !payload.valid {
        return Ok(None);
    }
    let affiliate_id = payload.affiliate_id.ok_or_else(|| {
        AffiliateError::ParseError("valid lookup without affiliate_id".to_string())
    })?;
    Ok(Some(Affiliate {
        affiliate_id,
        display_name: payload.display_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pin_resolves_to_none() {
        let payload = PinLookupResponse {
            valid: false,
            affiliate_id: Some("aff-1".to_string()),
            display_name: None,
        };
        assert!(resolve_lookup(payload).unwrap().is_none());
    }

    #[test]
    fn valid_pin_resolves_to_affiliate() {
        let payload = PinLookupResponse {
            valid: true,
            affiliate_id: Some("aff-1".to_string()),
            display_name: Some("Partner One".to_string()),
        };
        let affiliate = resolve_lookup(payload).unwrap().unwrap();
        assert_eq!(affiliate.affiliate_id, "aff-1");
        assert_eq!(affiliate.display_name.as_deref(), Some("Partner One"));
    }

    #[test]
    fn valid_pin_without_id_is_a_contract_violation() {
        let payload = PinLookupResponse {
            valid: true,
            affiliate_id: None,
            display_name: None,
        };
        assert!(matches!(
            resolve_lookup(payload),
            Err(AffiliateError::ParseError(_))
        ));
    }
}
