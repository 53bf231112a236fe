use axum::{
    http::{HeaderName, HeaderValue},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::JwtVerifier;
use crate::clock::Clock;
use crate::config::Settings;
use crate::repositories::{AppointmentsRepository, NotificationsRepository};
use crate::routes;
use crate::services::{
    CacheProvider, CreateAppointmentService, ListProviderAppointmentsService,
    ProviderAvailabilityService,
};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub jwt: JwtVerifier,
    pub appointments: Arc<dyn AppointmentsRepository>,
    pub notifications: Arc<dyn NotificationsRepository>,
    pub cache: Arc<dyn CacheProvider>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        appointments: Arc<dyn AppointmentsRepository>,
        notifications: Arc<dyn NotificationsRepository>,
        cache: Arc<dyn CacheProvider>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let jwt = JwtVerifier::new(&settings.jwt_secret);

        Arc::new(Self {
            settings,
            jwt,
            appointments,
            notifications,
            cache,
            clock,
        })
    }

    pub fn create_appointment(&self) -> CreateAppointmentService {
        CreateAppointmentService::new(
            self.appointments.clone(),
            self.notifications.clone(),
            self.cache.clone(),
            self.clock.clone(),
            self.settings.office_hours,
        )
    }

    pub fn list_provider_appointments(&self) -> ListProviderAppointmentsService {
        ListProviderAppointmentsService::new(
            self.appointments.clone(),
            self.cache.clone(),
            self.settings.office_hours,
        )
    }

    pub fn provider_availability(&self) -> ProviderAvailabilityService {
        ProviderAvailabilityService::new(
            self.appointments.clone(),
            self.clock.clone(),
            self.settings.office_hours,
        )
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    // DEBUG spans keep INFO output to one line per service event
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    // Generated when the client sends none, echoed on the response
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(trace_layer)
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let max_age = if settings.env.is_dev() {
        std::time::Duration::from_secs(86400)
    } else {
        std::time::Duration::from_secs(3600)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            HeaderName::from_static(X_REQUEST_ID),
        ]))
        .allow_credentials(true)
        .max_age(max_age)
}
