use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::{Created, DataResponse};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::{CreateAppointmentData, CreateAppointmentRequest, DayQuery};
use crate::error::AppError;

/// POST /appointments
///
/// Book the caller with a provider.
pub async fn create_appointment(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!(
        user_id = %auth.user_id,
        provider_id = %req.provider_id,
        date = %req.date,
        "Creating appointment"
    );

    let appointment = state
        .create_appointment()
        .execute(CreateAppointmentData {
            provider_id: req.provider_id,
            user_id: auth.user_id,
            date: req.date,
        })
        .await?;

    Ok(Created(appointment))
}

/// GET /appointments/me
///
/// The caller's schedule as a provider for one day.
pub async fn list_my_provider_appointments(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let appointments = state
        .list_provider_appointments()
        .execute(auth.user_id, query.year, query.month, query.day)
        .await?;

    Ok(DataResponse::new(appointments))
}
