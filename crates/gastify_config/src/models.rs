// --- File: crates/gastify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Catering Package Tier ---
// One entry per bookable package. `service_minutes` is the live-service
// span; prep and cleanup buffers are global (see BookingConfig).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PackageTier {
    pub code: String,
    pub service_minutes: i64,
    pub display_name: Option<String>,
    pub unit_amount: Option<i64>,
    pub currency: Option<String>,
}

// --- Booking Rules Config ---
// Every field is optional in the file; gastify_booking resolves the
// defaults into an immutable BookingPolicy at startup.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BookingConfig {
    pub time_zone: Option<String>,
    pub hours_start: Option<u32>,
    pub hours_end: Option<u32>,
    pub max_per_day: Option<usize>,
    pub max_per_slot: Option<usize>,
    pub prep_minutes: Option<i64>,
    pub cleanup_minutes: Option<i64>,
    pub default_service_minutes: Option<i64>,
    #[serde(default)]
    pub packages: Vec<PackageTier>,
}

// --- Stripe Config ---
// Holds non-secret Stripe config. Webhook signing secret loaded directly
// from env var: STRIPE_WEBHOOK_SECRET
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StripeConfig {
    pub webhook_tolerance_secs: Option<i64>,
    pub default_currency: Option<String>,
}

// --- Affiliate Lookup Config ---
// The PIN resolution endpoint for the direct booking API.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AffiliateConfig {
    pub lookup_url: String,
    pub timeout_secs: Option<u64>,
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>,
    pub calendar_id: Option<String>,
    pub time_zone: Option<String>,
    // Secrets loaded directly from env vars:
    // GOOGLE_CALENDAR_SERVICE_ACCOUNT_JSON
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_stripe: bool,
    #[serde(default)]
    pub use_affiliate: bool,

    // Booking rules are always present; an empty section yields defaults.
    #[serde(default)]
    pub booking: BookingConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub affiliate: Option<AffiliateConfig>,
}
