// File: services/gastify_backend/src/main.rs
use axum::{routing::get, Router};
use gastify_booking::handlers::BookingState;
use gastify_booking::policy::BookingPolicy;
use gastify_booking::routes as booking_routes;
use gastify_common::logging;
use gastify_common::services::ServiceFactory;
use gastify_config::load_config;
#[cfg(feature = "stripe")]
use gastify_stripe::{handlers::StripeState, routes as stripe_routes};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod service_factory;
use service_factory::GastifyServiceFactory;

#[tokio::main]
async fn main() {
    let config = Arc::new(load_config().expect("Failed to load config"));
    logging::init();

    let factory = GastifyServiceFactory::new(config.clone()).await;
    let policy = Arc::new(BookingPolicy::from_config(&config.booking));

    let mut api_router = Router::new().route("/", get(|| async { "Welcome to Gastify API!" }));

    match factory.calendar_service() {
        Some(calendar) => {
            let calendar_id = config
                .gcal
                .as_ref()
                .and_then(|g| g.calendar_id.clone())
                .unwrap_or_else(|| "primary".to_string());

            let booking_state = Arc::new(BookingState {
                config: config.clone(),
                policy: policy.clone(),
                calendar_id: calendar_id.clone(),
                calendar: calendar.clone(),
                affiliates: factory.affiliate_service(),
            });
            api_router = api_router.merge(booking_routes::routes(booking_state));

            #[cfg(feature = "stripe")]
            {
                if gastify_common::is_stripe_enabled(&config) {
                    let stripe_state = Arc::new(StripeState {
                        config: config.clone(),
                        policy: policy.clone(),
                        calendar_id,
                        calendar,
                    });
                    api_router = api_router.merge(stripe_routes::routes(stripe_state));
                }
            }
        }
        None => {
            warn!("No calendar service available; booking and webhook routes disabled.");
        }
    }

    let mut app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http());

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use gastify_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        let openapi_doc = BookingApiDoc::openapi();
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.unwrap();
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
