pub mod appointments;
pub mod health;
pub mod providers;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Appointments
        .route("/appointments", post(appointments::create_appointment))
        .route(
            "/appointments/me",
            get(appointments::list_my_provider_appointments),
        )
        // Provider availability
        .route(
            "/providers/:provider_id/day-availability",
            get(providers::day_availability),
        )
        .route(
            "/providers/:provider_id/month-availability",
            get(providers::month_availability),
        )
}
