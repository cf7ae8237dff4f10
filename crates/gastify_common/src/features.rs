// --- File: crates/gastify_common/src/features.rs ---
//! Feature flag handling for the Gastify application.
//!
//! Features are gated twice: at compile time with `#[cfg(feature = "...")]`
//! and at runtime with the `use_*` flags in the configuration. A feature is
//! only active when it is compiled in, enabled, and its config section is
//! present.

use gastify_config::AppConfig;
use std::sync::Arc;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(
    _config: &Arc<AppConfig>,
    use_feature: bool,
    feature_config: Option<&T>,
) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Google Calendar feature is enabled at runtime.
#[cfg(feature = "gcal")]
pub fn is_gcal_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_gcal, config.gcal.as_ref())
}

/// Check if the Stripe feature is enabled at runtime.
#[cfg(feature = "stripe")]
pub fn is_stripe_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_stripe, config.stripe.as_ref())
}

/// Check if the affiliate lookup feature is enabled at runtime.
#[cfg(feature = "affiliate")]
pub fn is_affiliate_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config, config.use_affiliate, config.affiliate.as_ref())
}
