// --- File: crates/services/gastify_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Wires the external collaborators (Google Calendar, affiliate directory)
//! behind the `BoxedError` trait objects the booking handlers consume.
use gastify_config::AppConfig;
use std::sync::Arc;
#[allow(unused_imports)]
use {
    chrono::{DateTime, Utc},
    gastify_common::is_feature_enabled,
    gastify_common::services::{
        Affiliate, AffiliateService, BookingRecord, BoxFuture, BoxedError, CalendarService,
        CreatedBooking, ExistingBooking, ServiceFactory,
    },
    tracing::{error, info},
};

#[cfg(feature = "gcal")]
use gastify_gcal::{auth::create_calendar_hub, service::GoogleCalendarService};

#[cfg(feature = "affiliate")]
use gastify_booking::affiliate::HttpAffiliateService;

/// Adapter turning the Google service's concrete error into `BoxedError`
/// so handlers can hold it as a trait object.
#[cfg(feature = "gcal")]
struct BoxedCalendarService {
    inner: GoogleCalendarService,
}

#[cfg(feature = "gcal")]
impl CalendarService for BoxedCalendarService {
    type Error = BoxedError;

    fn list_bookings(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        idempotency_tag: Option<&str>,
    ) -> BoxFuture<'_, Vec<ExistingBooking>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let idempotency_tag = idempotency_tag.map(|s| s.to_string());
        let inner = &self.inner;

        Box::pin(async move {
            inner
                .list_bookings(&calendar_id, start, end, idempotency_tag.as_deref())
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn create_booking(
        &self,
        calendar_id: &str,
        record: BookingRecord,
    ) -> BoxFuture<'_, CreatedBooking, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let inner = &self.inner;

        Box::pin(async move {
            inner
                .create_booking(&calendar_id, record)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }

    fn mark_booking_cancelled(
        &self,
        calendar_id: &str,
        event_id: &str,
        notify_attendees: bool,
    ) -> BoxFuture<'_, CreatedBooking, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let inner = &self.inner;

        Box::pin(async move {
            inner
                .mark_booking_cancelled(&calendar_id, &event_id, notify_attendees)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}

/// Same adapter for the affiliate lookup client.
#[cfg(feature = "affiliate")]
struct BoxedAffiliateService {
    inner: HttpAffiliateService,
}

#[cfg(feature = "affiliate")]
impl AffiliateService for BoxedAffiliateService {
    type Error = BoxedError;

    fn verify_pin(&self, pin: &str) -> BoxFuture<'_, Option<Affiliate>, Self::Error> {
        let pin = pin.to_string();
        let inner = &self.inner;

        Box::pin(async move {
            inner
                .verify_pin(&pin)
                .await
                .map_err(|e| BoxedError(Box::new(e)))
        })
    }
}

/// Service factory for the backend binary.
///
/// Initializes services once at startup based on configuration and feature
/// flags, and hands them out through the `ServiceFactory` trait.
pub struct GastifyServiceFactory {
    #[allow(dead_code)]
    config: Arc<AppConfig>,
    #[cfg(feature = "gcal")]
    calendar_service: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    #[cfg(feature = "affiliate")]
    affiliate_service: Option<Arc<dyn AffiliateService<Error = BoxedError>>>,
}

impl GastifyServiceFactory {
    /// Create a new service factory.
    pub async fn new(config: Arc<AppConfig>) -> Self {
        #[allow(unused_mut)]
        let mut factory = Self {
            config: config.clone(),
            #[cfg(feature = "gcal")]
            calendar_service: None,
            #[cfg(feature = "affiliate")]
            affiliate_service: None,
        };

        #[cfg(feature = "gcal")]
        {
            if is_feature_enabled(&config, config.use_gcal, config.gcal.as_ref()) {
                info!("Initializing Google Calendar service...");
                match create_calendar_hub(config.gcal.as_ref().unwrap()).await {
                    Ok(hub) => {
                        let inner = GoogleCalendarService::new(Arc::new(hub));
                        factory.calendar_service =
                            Some(Arc::new(BoxedCalendarService { inner }));
                        info!("Google Calendar service initialized.");
                    }
                    Err(e) => {
                        error!(
                            "Failed to initialize Google Calendar service: {}. Booking routes disabled.",
                            e
                        );
                    }
                }
            } else {
                info!("GCal feature compiled, but disabled via runtime config or missing gcal config section.");
            }
        }

        #[cfg(feature = "affiliate")]
        {
            if is_feature_enabled(&config, config.use_affiliate, config.affiliate.as_ref()) {
                let inner = HttpAffiliateService::new(config.affiliate.as_ref().unwrap());
                factory.affiliate_service = Some(Arc::new(BoxedAffiliateService { inner }));
                info!("Affiliate lookup service initialized.");
            }
        }

        factory
    }
}

impl ServiceFactory for GastifyServiceFactory {
    fn calendar_service(&self) -> Option<Arc<dyn CalendarService<Error = BoxedError>>> {
        #[cfg(feature = "gcal")]
        {
            return self.calendar_service.clone();
        }
        #[cfg(not(feature = "gcal"))]
        None
    }

    fn affiliate_service(&self) -> Option<Arc<dyn AffiliateService<Error = BoxedError>>> {
        #[cfg(feature = "affiliate")]
        {
            return self.affiliate_service.clone();
        }
        #[cfg(not(feature = "affiliate"))]
        None
    }
}
