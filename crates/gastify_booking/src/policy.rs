// --- File: crates/gastify_booking/src/policy.rs ---
//! The resolved booking rules.
//!
//! `BookingConfig` is what operators write; `BookingPolicy` is the
//! immutable value every pure function and the orchestrator receive, with
//! all defaults applied. Tests construct it directly to vary limits.

use chrono::Duration;
use chrono_tz::Tz;
use gastify_config::BookingConfig;
use std::collections::HashMap;
use std::str::FromStr;

/// Fallback timezone when the configured name does not parse.
pub const DEFAULT_TIME_ZONE: Tz = Tz::Europe__Zurich;

#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Civil timezone for business-hours and calendar-day derivation.
    pub time_zone: Tz,
    /// First offerable local start hour (inclusive).
    pub hours_start: u32,
    /// End of business hours (exclusive; this hour is never offerable).
    pub hours_end: u32,
    /// Maximum active bookings per calendar day.
    pub max_per_day: usize,
    /// Maximum active bookings with overlapping operational windows.
    pub max_per_slot: usize,
    /// Setup buffer before the live service.
    pub prep: Duration,
    /// Teardown buffer after the live service.
    pub cleanup: Duration,
    /// Service span used for package codes outside the table.
    pub default_service: Duration,
    /// Live-service span per package code, keys lowercased.
    pub packages: HashMap<String, Duration>,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        let packages = [("small", 120), ("medium", 150), ("large", 180)]
            .into_iter()
            .map(|(code, minutes)| (code.to_string(), Duration::minutes(minutes)))
            .collect();

        Self {
            time_zone: DEFAULT_TIME_ZONE,
            hours_start: 9,
            hours_end: 22,
            max_per_day: 3,
            max_per_slot: 2,
            prep: Duration::hours(1),
            cleanup: Duration::hours(1),
            default_service: Duration::minutes(120),
            packages,
        }
    }
}

impl BookingPolicy {
    /// Resolve a policy from configuration, falling back to the defaults
    /// field by field. A bad timezone name degrades to the default zone
    /// rather than failing startup.
    pub fn from_config(config: &BookingConfig) -> Self {
        let mut policy = Self::default();

        if let Some(name) = &config.time_zone {
            policy.time_zone = Tz::from_str(name).unwrap_or(DEFAULT_TIME_ZONE);
        }
        if let Some(hour) = config.hours_start {
            policy.hours_start = hour;
        }
        if let Some(hour) = config.hours_end {
            policy.hours_end = hour;
        }
        if let Some(limit) = config.max_per_day {
            policy.max_per_day = limit;
        }
        if let Some(limit) = config.max_per_slot {
            policy.max_per_slot = limit;
        }
        if let Some(minutes) = config.prep_minutes {
            policy.prep = Duration::minutes(minutes);
        }
        if let Some(minutes) = config.cleanup_minutes {
            policy.cleanup = Duration::minutes(minutes);
        }
        if let Some(minutes) = config.default_service_minutes {
            policy.default_service = Duration::minutes(minutes);
        }
        if !config.packages.is_empty() {
            policy.packages = config
                .packages
                .iter()
                .map(|tier| {
                    (
                        tier.code.to_ascii_lowercase(),
                        Duration::minutes(tier.service_minutes),
                    )
                })
                .collect();
        }

        policy
    }
}
